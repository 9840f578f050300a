use std::env;
use std::io::Write;

use anyhow::Result;
use tabwriter::TabWriter;

#[derive(Clone, Copy, PartialEq, Eq)]
enum CheckStatus {
    Ok,
    Warn,
}

struct Check {
    name: &'static str,
    status: CheckStatus,
    detail: String,
}

impl Check {
    fn ok(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Ok,
            detail: detail.into(),
        }
    }

    fn warn(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Warn,
            detail: detail.into(),
        }
    }
}

pub fn handle() -> Result<()> {
    let checks = vec![check_remote_solver(), check_log_filter(), check_in_process_solver()];

    let mut writer = TabWriter::new(Vec::new()).padding(2);
    writeln!(writer, "Check\tStatus\tDetails")?;
    for check in &checks {
        let status = match check.status {
            CheckStatus::Ok => "ok",
            CheckStatus::Warn => "warn",
        };
        writeln!(writer, "{}\t{}\t{}", check.name, status, check.detail)?;
    }
    writer.flush()?;
    let table = String::from_utf8(writer.into_inner()?)?;
    println!("{table}");

    if checks.iter().any(|c| c.status == CheckStatus::Warn) {
        eprintln!("Some checks reported warnings. Review the details above to complete setup.");
    }

    Ok(())
}

fn check_remote_solver() -> Check {
    match env::var("REMOTE_SOLVER_URL") {
        Ok(url) if !url.trim().is_empty() => Check::ok("remote-solver", format!("REMOTE_SOLVER_URL set to {url}")),
        _ => Check::warn(
            "remote-solver",
            "REMOTE_SOLVER_URL is not set; large or always-remote builds will fail to dispatch",
        ),
    }
}

fn check_log_filter() -> Check {
    match env::var("RUST_LOG") {
        Ok(filter) => Check::ok("log-filter", format!("RUST_LOG set to {filter}")),
        Err(_) => Check::warn("log-filter", "RUST_LOG is not set; falling back to --log-level only"),
    }
}

fn check_in_process_solver() -> Check {
    if terra_algo::solver::dispatch::primary_disabled() {
        Check::warn(
            "in-process-solver",
            "the primary in-process solver has been disabled after repeated failures this process; builds will fall back to remote dispatch or the waterfall heuristic",
        )
    } else {
        Check::ok("in-process-solver", "primary in-process solver has not been disabled")
    }
}
