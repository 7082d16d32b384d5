pub(crate) use crate::error::Result;
pub(crate) use bytes::Bytes;
pub(crate) use reqwest::{Method, Response, Url};
pub(crate) use serde::{Deserialize, Serialize};
pub(crate) use serde_json::Value;

pub mod text_to_speech;

type QueryValues = Vec<(&'static str, String)>;

#[derive(Debug)]
pub enum RequestBody {
    Json(Value),
    Empty,
}

#[allow(async_fn_in_trait)]
pub trait ElevenLabsEndpoint {
    const PATH: &'static str;

    const METHOD: Method;

    type ResponseBody;

    fn query_params(&self) -> Option<QueryValues> {
        None
    }

    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![]
    }

    /// Extra headers, e.g. `Accept` for audio endpoints.
    fn headers(&self) -> Vec<(&'static str, &'static str)> {
        vec![]
    }

    fn request_body(&self) -> Result<RequestBody> {
        Ok(RequestBody::Empty)
    }

    async fn response_body(self, resp: Response) -> Result<Self::ResponseBody>;

    fn url(&self, base: &Url) -> Result<Url> {
        let mut url = base.clone();

        let mut path = Self::PATH.to_string();

        for (placeholder, id) in self.path_params() {
            path = path.replace(placeholder, id);
        }

        url.set_path(&path);

        if let Some(query_params) = self.query_params() {
            url.query_pairs_mut().extend_pairs(query_params);
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        id: String,
    }

    impl ElevenLabsEndpoint for Probe {
        const PATH: &'static str = "/v1/things/:id";
        const METHOD: Method = Method::GET;
        type ResponseBody = ();

        fn path_params(&self) -> Vec<(&'static str, &str)> {
            vec![(":id", self.id.as_str())]
        }

        fn query_params(&self) -> Option<QueryValues> {
            Some(vec![("limit", "3".to_string())])
        }

        async fn response_body(self, _resp: Response) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn url_substitutes_path_and_query() {
        let base: Url = "http://127.0.0.1:9000".parse().unwrap();
        let url = Probe { id: "abc".into() }.url(&base).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/v1/things/abc?limit=3");
    }
}
