//! Command line surface of the `narrator` binary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use narrator::{NarrationReport, Narrator, NarratorConfig};
use narrator_domain::{DialogueScript, flatten};
use narrator_elevenlabs::{ElevenLabsClient, ElevenLabsSpeech};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

#[derive(Parser, Debug)]
#[command(author, version, about = "Render dialogue scripts to a single audio track")]
pub struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Synthesize every line and write the joined track.
    Render {
        /// Dialogue JSON; `-` reads stdin.
        #[arg(long)]
        script: PathBuf,
        /// TOML configuration; defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output WAV, overriding `output_dir`/`output_file`.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Hide progress bars.
        #[arg(long)]
        quiet: bool,
    },
    /// Print the synthesis jobs a script expands to, without synthesizing.
    Flatten {
        #[arg(long)]
        script: PathBuf,
        /// Emit the jobs as a JSON array.
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Render {
            script,
            config,
            out,
            quiet,
        } => {
            let script = read_script(&script).await?;
            let mut config = match config {
                Some(path) => NarratorConfig::load(&path)
                    .await
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => NarratorConfig::default(),
            };
            if quiet {
                config.show_progress = false;
            }
            let output = out.unwrap_or_else(|| config.output_path());

            let client = ElevenLabsClient::from_env_with_config(config.provider.client_config())
                .context("building ElevenLabs client")?;
            let speech = ElevenLabsSpeech::new(client)
                .model(config.provider.model)
                .voice_settings(config.provider.voice_settings())
                .output_format(config.provider.output_format);

            let narrator = Narrator::new(speech, config).await?;
            let report = narrator
                .narrate_to(&script, &output)
                .await
                .context("rendering dialogue")?;
            print_summary(&report);
            Ok(())
        }
        Command::Flatten { script, json } => {
            let script = read_script(&script).await?;
            let jobs = flatten(script.turns());
            if json {
                println!("{}", serde_json::to_string_pretty(&jobs)?);
                return Ok(());
            }
            for job in jobs {
                let indent = "  ".repeat(job.depth);
                println!("{indent}{}\t{}\t{}", job.fingerprint, job.speaker, job.text);
            }
            Ok(())
        }
    }
}

async fn read_script(path: &Path) -> Result<DialogueScript> {
    let raw = if path == Path::new("-") {
        let mut raw = String::new();
        tokio::io::stdin()
            .read_to_string(&mut raw)
            .await
            .context("reading script from stdin")?;
        raw
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading script {}", path.display()))?
    };
    DialogueScript::from_json(&raw).context("parsing dialogue script")
}

fn print_summary(report: &NarrationReport) {
    println!("{}", report.output.display());
    println!(
        "{:.1}s, {} turns joined, {} synthesized, {} cached, {} skipped, {} failed",
        report.duration_ms as f64 / 1000.0,
        report.turns_included,
        report.synthesis.synthesized(),
        report.synthesis.cached(),
        report.synthesis.skipped(),
        report.synthesis.failed(),
    );
    for (speaker, reason) in &report.turns_skipped {
        println!("  missing: {speaker} ({reason})");
    }
}
