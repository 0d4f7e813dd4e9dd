//! One-shot `deobfuscate` and `detect` subcommands.

use std::io::Read;
use std::path::Path;

use tracing::info;

use unravel_engine::{DeobfuscateRequest, DeobfuscateResponse, Deobfuscator};

/// Flags of the `deobfuscate` subcommand.
pub(crate) struct DeobfuscateArgs {
    pub json: bool,
    pub detect_only: bool,
    pub no_optimize: bool,
    pub aggressive_vm: bool,
    pub timeout_ms: Option<u64>,
}

fn read_source(file: &Path) -> Result<String, Box<dyn std::error::Error>> {
    if file.as_os_str() == "-" {
        let mut code = String::new();
        std::io::stdin().read_to_string(&mut code)?;
        return Ok(code);
    }
    Ok(std::fs::read_to_string(file)?)
}

pub(crate) fn build_request(code: String, args: &DeobfuscateArgs) -> DeobfuscateRequest {
    let mut request = DeobfuscateRequest::new(code).with_aggressive_vm(args.aggressive_vm);
    if args.detect_only {
        request = request.detect_only();
    }
    if args.no_optimize {
        request = request.with_ast_optimization(false);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        request = request.with_timeout(timeout_ms);
    }
    request
}

/// Human-readable summary, one item per line.
pub(crate) fn summary(response: &DeobfuscateResponse) -> String {
    let mut lines = Vec::new();
    if response.detected_techniques.is_empty() {
        lines.push("Techniques: none".to_string());
    } else {
        let names: Vec<&str> = response.detected_techniques.iter().map(|t| t.as_str()).collect();
        lines.push(format!("Techniques: {}", names.join(", ")));
    }
    lines.push(format!("Confidence: {:.2}", response.confidence));
    if let Some(vm) = &response.vm_detected {
        lines.push(format!(
            "VM: {} ({} instructions, deobfuscated: {})",
            vm.vm_type, vm.instructions, vm.deobfuscated
        ));
    }
    for warning in &response.warnings {
        lines.push(format!("Warning: {}", warning));
    }
    lines.join("\n")
}

/// Run the `deobfuscate` subcommand. Code goes to stdout, the summary to stderr.
pub(crate) async fn run_deobfuscate(
    engine: &Deobfuscator,
    file: &Path,
    args: DeobfuscateArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let code = read_source(file)?;
    info!(file = %file.display(), bytes = code.len(), "Deobfuscating");

    let response = engine.deobfuscate(build_request(code, &args)).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        if !args.detect_only {
            println!("{}", response.code);
        }
        eprintln!("{}", summary(&response));
    }
    Ok(())
}

/// Run the `detect` subcommand.
pub(crate) async fn run_detect(
    engine: &Deobfuscator,
    file: &Path,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let args = DeobfuscateArgs {
        json,
        detect_only: true,
        no_optimize: false,
        aggressive_vm: false,
        timeout_ms: None,
    };
    let code = read_source(file)?;
    let response = engine.deobfuscate(build_request(code, &args)).await?;

    if json {
        let report = serde_json::json!({
            "detectedTechniques": response.detected_techniques,
            "confidence": response.confidence,
            "warnings": response.warnings,
            "vmDetected": response.vm_detected,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", summary(&response));
    }
    Ok(())
}
