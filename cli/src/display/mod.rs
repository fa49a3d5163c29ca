use breakwater_core::RunReport;
use colored::Colorize;

pub fn print_report(report: &RunReport) {
    println!("\n{}", "=".repeat(60));
    println!("Breakwater Analysis Report");
    println!("{}", "=".repeat(60));
    println!("Project: {}", report.project);
    println!("Duration: {}ms", report.elapsed);
    println!("Scans: {}", report.scans.len());

    for (scan_id, scan) in &report.scans {
        println!();
        println!("  Scan {} ({})", scan_id, scan.plugin.name);
        if scan.result.is_none() {
            println!("    {}", "no result received".yellow());
            continue;
        }

        println!("    Components: {}", scan.components());
        println!("    Licenses: {}", scan.licenses());
        println!(
            "    Vulnerabilities: {} violations, {} warnings",
            colored_count(scan.vulnerability_violations()),
            colored_count(scan.vulnerability_warnings())
        );
        println!(
            "    Legal: {} violations, {} warnings",
            colored_count(scan.legal_violations()),
            colored_count(scan.legal_warnings())
        );
        if let Some(url) = scan.url() {
            println!("    Details: {}", url);
        }
    }

    if !report.errors.is_empty() {
        println!();
        println!("Errors:");
        for error in &report.errors {
            println!("  - {}", error.red());
        }
    }

    println!();
    if report.passed {
        println!("{}", "Passed".green());
    } else {
        println!("{}", "Failed".red());
    }
}

fn colored_count(count: i64) -> String {
    if count > 0 {
        count.to_string().red().to_string()
    } else {
        count.to_string()
    }
}

pub fn print_json(report: &RunReport) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
