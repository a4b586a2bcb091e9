use crate::cli::{actions::Action, commands::DEFAULT_PROVIDER_URL, globals::GlobalArgs};
use anyhow::{Context, Result};
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let provider_url = matches
        .get_one::<String>("provider-url")
        .map_or_else(|| DEFAULT_PROVIDER_URL.to_string(), String::to_string);

    let mut globals = GlobalArgs::new(provider_url);

    globals.set_api_key(SecretString::from(
        matches
            .get_one::<String>("api-key")
            .cloned()
            .context("missing required argument: --api-key")?,
    ));

    globals.project_id = matches
        .get_one::<String>("project-id")
        .cloned()
        .context("missing required argument: --project-id")?;

    globals.service_account_email = matches
        .get_one::<String>("service-account-email")
        .cloned()
        .context("missing required argument: --service-account-email")?;

    let key = matches
        .get_one::<String>("service-account-key")
        .cloned()
        .context("missing required argument: --service-account-key")?;
    globals.set_service_account_key(&key);

    globals.production = matches.get_flag("production");

    let action = Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
    };

    Ok((action, globals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn test_handler_builds_globals() -> Result<()> {
        let matches = commands::new().get_matches_from(vec![
            "portero",
            "--api-key",
            "web-api-key",
            "--project-id",
            "demo-project",
            "--service-account-email",
            "svc@demo-project.iam.gserviceaccount.com",
            "--service-account-key",
            "line1\\nline2",
            "--port",
            "9000",
        ]);

        let (action, globals) = handler(&matches)?;

        let Action::Server { port } = action;
        assert_eq!(port, 9000);
        assert_eq!(globals.provider_url, commands::DEFAULT_PROVIDER_URL);
        assert_eq!(globals.api_key.expose_secret(), "web-api-key");
        assert_eq!(globals.project_id, "demo-project");
        assert_eq!(
            globals.service_account_email,
            "svc@demo-project.iam.gserviceaccount.com"
        );
        assert_eq!(globals.service_account_key.expose_secret(), "line1\nline2");
        assert!(!globals.production);
        Ok(())
    }
}
