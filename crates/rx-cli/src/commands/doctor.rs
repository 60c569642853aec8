//! Doctor command
//!
//! Diagnose configuration and server access.

use anyhow::{bail, Result};
use clap::Args;
use rx_client::{ExportApi, HttpExportApi};
use rx_core::modules::OperationalModules;
use rx_core::user::PrivilegeType;

use super::AppContext;

/// Arguments for the doctor command
#[derive(Debug, Args)]
pub struct DoctorArgs {
    /// Only check local configuration, do not contact the server
    #[arg(long)]
    pub offline: bool,

    /// Verbose output
    #[arg(id = "details", short = 'd', long = "details")]
    pub verbose: bool,
}

/// Check result
#[derive(Debug)]
struct CheckResult {
    name: String,
    passed: bool,
    message: String,
    suggestion: Option<String>,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.to_string(),
            suggestion: None,
        }
    }

    fn fail(name: &str, message: &str, suggestion: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.to_string(),
            suggestion: suggestion.map(|s| s.to_string()),
        }
    }

    fn warn(name: &str, message: &str, suggestion: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: format!("⚠ {}", message),
            suggestion: suggestion.map(|s| s.to_string()),
        }
    }

    fn is_warning(&self) -> bool {
        self.passed && self.message.starts_with('⚠')
    }
}

/// Execute the doctor command
pub async fn execute(args: DoctorArgs, ctx: &AppContext) -> Result<()> {
    use colored::Colorize;

    let mut results = check_configuration(ctx);
    println!("\n{}", "1. Configuration".bold().underline());
    print_section(&results, args.verbose);

    if !args.offline {
        let server = match ctx.api() {
            Ok(api) => check_server(&api).await,
            Err(e) => vec![CheckResult::fail(
                "Client",
                &format!("{:#}", e),
                Some("Check server.base_url and server.timeout_secs"),
            )],
        };
        println!("\n{}", "2. Server".bold().underline());
        print_section(&server, args.verbose);
        results.extend(server);
    }

    let warnings: Vec<&CheckResult> = results.iter().filter(|r| r.is_warning()).collect();
    let errors: Vec<&CheckResult> = results.iter().filter(|r| !r.passed).collect();

    println!(
        "\n{}: {} warnings, {} errors",
        "Summary".bold(),
        warnings.len().to_string().yellow(),
        errors.len().to_string().red()
    );

    if !errors.is_empty() {
        println!("\n{}", "✗ Errors:".red());
        for result in &errors {
            println!("  - {}: {}", result.name, result.message);
            if let Some(suggestion) = &result.suggestion {
                println!("    Fix: {}", suggestion);
            }
        }
        bail!("{} check(s) failed", errors.len());
    }

    if warnings.is_empty() {
        println!("\n{} All checks passed!", "✓".green());
    }

    Ok(())
}

fn print_section(results: &[CheckResult], verbose: bool) {
    for result in results {
        for line in result_lines(result, verbose) {
            println!("{}", line);
        }
    }
}

fn result_lines(result: &CheckResult, verbose: bool) -> Vec<String> {
    use colored::Colorize;

    let status = if !result.passed {
        "✗".red()
    } else if result.is_warning() {
        "⚠".yellow()
    } else {
        "✓".green()
    };

    let mut lines = vec![format!("   {} {}: {}", status, result.name, result.message)];
    if verbose {
        if let Some(suggestion) = &result.suggestion {
            lines.push(format!("     {}", suggestion.dimmed()));
        }
    }
    lines
}

fn check_configuration(ctx: &AppContext) -> Vec<CheckResult> {
    let mut results = vec![CheckResult::ok("rx-export version", env!("CARGO_PKG_VERSION"))];

    match &ctx.config_path {
        Some(path) => results.push(CheckResult::ok("Config file", &path.display().to_string())),
        None => results.push(CheckResult::warn(
            "Config file",
            "not found, using defaults",
            Some("Run 'rx-export config reset' to create one"),
        )),
    }

    results.push(CheckResult::ok("Server URL", &ctx.config.server.base_url));

    if ctx.config.server.auth_token.is_some() {
        results.push(CheckResult::ok("Auth token", "set"));
    } else {
        results.push(CheckResult::warn(
            "Auth token",
            "not set",
            Some("Set server.auth_token or RX_AUTH_TOKEN"),
        ));
    }

    results
}

async fn check_server(api: &HttpExportApi) -> Vec<CheckResult> {
    let mut results = Vec::new();

    match api.fetch_user_info().await {
        Ok(user) => {
            results.push(CheckResult::ok("Signed in as", &user.username));
            if user.has_privilege(PrivilegeType::Analytics) {
                results.push(CheckResult::ok("Analytics privilege", "granted"));
            } else {
                results.push(CheckResult::fail(
                    "Analytics privilege",
                    "missing",
                    Some("Ask an organisation admin to grant Analytics"),
                ));
            }
        }
        Err(e) => {
            results.push(CheckResult::fail(
                "Server",
                &e.user_message(),
                Some("Check server.base_url and the auth token"),
            ));
            return results;
        }
    }

    match api.fetch_operational_modules().await {
        Ok(raw) => match OperationalModules::from_raw(raw) {
            Ok(modules) if modules.subject_types().is_empty() => {
                results.push(CheckResult::warn(
                    "Operational modules",
                    "no subject types configured",
                    None,
                ));
            }
            Ok(modules) => results.push(CheckResult::ok(
                "Operational modules",
                &format!("{} subject types", modules.subject_types().len()),
            )),
            Err(e) => results.push(CheckResult::fail(
                "Operational modules",
                &e.to_string(),
                Some("Fix the form mapping in the app designer"),
            )),
        },
        Err(e) => results.push(CheckResult::fail("Operational modules", &e.user_message(), None)),
    }

    match api.fetch_job_statuses(0).await {
        Ok(page) => results.push(CheckResult::ok(
            "Export jobs",
            &format!("{} on record", page.total_elements),
        )),
        Err(e) => results.push(CheckResult::warn("Export jobs", &e.user_message(), None)),
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use rx_core::config::Config;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_check_result_kinds() {
        assert!(CheckResult::ok("test", "message").passed);
        assert!(!CheckResult::fail("test", "error", Some("fix it")).passed);
        assert!(CheckResult::warn("test", "careful", None).is_warning());
    }

    #[test]
    fn test_suggestion_only_shown_with_details() {
        colored::control::set_override(false);
        let result = CheckResult::fail("Server", "unreachable", Some("Check server.base_url"));
        assert_eq!(result_lines(&result, false), vec!["   ✗ Server: unreachable"]);
        assert_eq!(
            result_lines(&result, true),
            vec!["   ✗ Server: unreachable", "     Check server.base_url"]
        );
    }

    #[test]
    fn test_missing_token_is_a_warning() {
        let ctx = AppContext {
            config: Config::default(),
            config_path: None,
            explicit_config: None,
        };
        let results = check_configuration(&ctx);
        let token = results.iter().find(|r| r.name == "Auth token").unwrap();
        assert!(token.is_warning());
    }

    #[tokio::test]
    async fn test_missing_privilege_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "username": "viewer@demo",
                "privileges": [{"privilegeType": "ViewSubject"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/web/operationalModules"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "subjectTypes": [], "programs": [], "encounterTypes": [], "formMappings": []
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/export/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [], "totalElements": 0, "totalPages": 0, "number": 0
            })))
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.server.base_url = server.uri();
        let api = HttpExportApi::new(&config.server, 10).unwrap();

        let results = check_server(&api).await;
        let privilege = results
            .iter()
            .find(|r| r.name == "Analytics privilege")
            .unwrap();
        assert!(!privilege.passed);
        assert!(results
            .iter()
            .any(|r| r.name == "Operational modules" && r.is_warning()));
    }
}
