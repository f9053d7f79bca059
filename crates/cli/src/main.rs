use clap::Parser;
use secoc_config::{DecodedVector, VectorFile};
use secoc_core::report::{CaptureSink, TracingSink};
use secoc_core::selftest::evaluate_vector;
use secoc_core::SoftwareCmac;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "SecOC CMAC authenticator self-test", long_about = None)]
struct Args {
    /// Path to a self-test vector file (YAML). Defaults to the built-in
    /// reference vector.
    #[arg(short, long)]
    vector: Option<PathBuf>,

    /// Enable stage-level tracing of the CMAC context
    #[arg(short, long)]
    trace: bool,

    /// Print a JSON report on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Serialize, Debug)]
struct RunReport {
    name: String,
    status: &'static str,
    code: i32,
    full_mac: Option<String>,
    truncated_mac: Option<String>,
    expected_mac: String,
    lines: Vec<String>,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays clean for --json.
    let level = if args.trace {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting SecOC self-test");

    let vector = if let Some(path) = &args.vector {
        info!("Loading vector file: {:?}", path);
        VectorFile::from_file(path)?.decode()?
    } else {
        info!("Using built-in reference vector");
        DecodedVector::reference()
    };

    let mut sink = (TracingSink, CaptureSink::new());
    let verdict = evaluate_vector(SoftwareCmac, &vector.as_vector(), &mut sink);
    let code = verdict.status_code();

    if code == 0 {
        info!("Self-test '{}' passed", vector.name);
    } else {
        warn!("Self-test '{}' failed with status {}", vector.name, code);
    }

    if args.json {
        // Kept on a mismatch so the computed value can be compared offline.
        let auth = verdict.computed();
        let report = RunReport {
            name: vector.name.clone(),
            status: if code == 0 { "pass" } else { "fail" },
            code,
            full_mac: auth.map(|a| hex::encode_upper(a.full.as_bytes())),
            truncated_mac: auth.map(|a| hex::encode_upper(a.truncated.as_bytes())),
            expected_mac: hex::encode_upper(&vector.expected_mac),
            lines: sink.1.lines,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(ExitCode::from(code.unsigned_abs() as u8))
}
