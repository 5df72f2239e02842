//! `diagnostics` command implementation.

use anyhow::Result;
use console::style;
use espdeploy::Device;

enum DiagStep {
    Exec(&'static str),
    Df,
    LsRoot,
}

const STEPS: [(&str, DiagStep); 4] = [
    (
        "Memory info (micropython.mem_info(1))",
        DiagStep::Exec("import micropython; micropython.mem_info(1)"),
    ),
    ("Filesystem usage (fs df)", DiagStep::Df),
    (
        "Free GC memory (gc.mem_free())",
        DiagStep::Exec("import gc; gc.collect(); print(gc.mem_free())"),
    ),
    ("Root listing (fs ls :/)", DiagStep::LsRoot),
];

/// Run the diagnostic sequence, streaming each step's output. Individual
/// failures are reported but do not stop the run.
pub(crate) fn cmd_diagnostics(port: &str) -> Result<()> {
    let dev = Device::new(port);
    eprintln!("Running diagnostics on {port}...");

    let mut all_ok = true;
    for (desc, step) in &STEPS {
        eprintln!("\n--- {desc} ---");
        let result = match step {
            DiagStep::Exec(code) => dev.exec_console(code),
            DiagStep::Df => dev.df_console(),
            DiagStep::LsRoot => dev.ls_root_console(),
        };
        dev.bridge().settle_brief();

        match result {
            Ok(out) if out.success() => {}
            Ok(out) => {
                all_ok = false;
                eprintln!(
                    "{} diagnostic step failed: {}",
                    style("✗").red(),
                    out.error_text()
                );
            }
            Err(err) => {
                all_ok = false;
                eprintln!("{} diagnostic step failed: {err}", style("✗").red());
            }
        }
    }

    if all_ok {
        eprintln!("\nDiagnostics completed. Review output above.");
    } else {
        eprintln!("\nDiagnostics completed with some errors.");
    }
    Ok(())
}
