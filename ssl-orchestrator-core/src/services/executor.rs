//! 后置命令执行器
//!
//! Runs the configured post command after certificate material lands, with
//! `${VAR}` placeholders substituted. Output is inherited so the command's
//! own logging ends up in the service log.

use std::collections::HashMap;
use std::path::Path;

use log::info;

use crate::error::{CoreError, CoreResult};

/// Post command runner.
#[derive(Debug, Default, Clone, Copy)]
pub struct Executor;

impl Executor {
    /// Creates an executor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Builds the substitution variables a post command may reference:
    /// `DOMAIN`, `CERT_DIR`, `CERT_FILE`, `KEY_FILE`, `FULLCHAIN_FILE`.
    #[must_use]
    pub fn build_vars(
        domain: &str,
        cert_dir: &Path,
        cert_path: &Path,
        key_path: &Path,
        fullchain_path: &Path,
    ) -> HashMap<String, String> {
        HashMap::from([
            ("DOMAIN".to_string(), domain.to_string()),
            ("CERT_DIR".to_string(), cert_dir.display().to_string()),
            ("CERT_FILE".to_string(), cert_path.display().to_string()),
            ("KEY_FILE".to_string(), key_path.display().to_string()),
            (
                "FULLCHAIN_FILE".to_string(),
                fullchain_path.display().to_string(),
            ),
        ])
    }

    /// Replaces every `${KEY}` occurrence with its value.
    fn substitute(command: &str, vars: &HashMap<String, String>) -> String {
        let mut command = command.to_string();
        for (key, value) in vars {
            command = command.replace(&format!("${{{key}}}"), value);
        }
        command
    }

    /// Runs a post command through `sh -c` with variables substituted.
    ///
    /// An empty command is a no-op. A non-zero exit becomes a
    /// [`CoreError::Hook`]; callers treat that as non-fatal.
    pub async fn run_post_command(
        &self,
        command: &str,
        vars: &HashMap<String, String>,
    ) -> CoreResult<()> {
        if command.is_empty() {
            return Ok(());
        }

        let command = Self::substitute(command, vars);
        info!("running post command: {command}");

        let status = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&command)
            .status()
            .await
            .map_err(|e| CoreError::Hook(format!("failed to spawn post command: {e}")))?;

        if !status.success() {
            return Err(CoreError::Hook(format!(
                "post command exited with {status}"
            )));
        }

        info!("post command finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn vars() -> HashMap<String, String> {
        Executor::build_vars(
            "www.example.com",
            &PathBuf::from("/certs/www.example.com"),
            &PathBuf::from("/certs/www.example.com/cert.pem"),
            &PathBuf::from("/certs/www.example.com/key.pem"),
            &PathBuf::from("/certs/www.example.com/fullchain.pem"),
        )
    }

    #[test]
    fn substitute_replaces_all_placeholders() {
        let command = Executor::substitute(
            "deploy ${DOMAIN} ${CERT_FILE} ${KEY_FILE} ${FULLCHAIN_FILE} ${CERT_DIR}",
            &vars(),
        );
        assert_eq!(
            command,
            "deploy www.example.com /certs/www.example.com/cert.pem \
             /certs/www.example.com/key.pem /certs/www.example.com/fullchain.pem \
             /certs/www.example.com"
        );
    }

    #[test]
    fn substitute_repeated_placeholder() {
        let command = Executor::substitute("${DOMAIN} ${DOMAIN}", &vars());
        assert_eq!(command, "www.example.com www.example.com");
    }

    #[test]
    fn substitute_leaves_unknown_placeholders() {
        let command = Executor::substitute("${DOMAIN} ${UNKNOWN}", &vars());
        assert_eq!(command, "www.example.com ${UNKNOWN}");
    }

    #[tokio::test]
    async fn empty_command_is_a_no_op() {
        let res = Executor::new().run_post_command("", &vars()).await;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
    }

    #[tokio::test]
    async fn successful_command() {
        let res = Executor::new()
            .run_post_command("test \"${DOMAIN}\" = \"www.example.com\"", &vars())
            .await;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
    }

    #[tokio::test]
    async fn failing_command_is_a_hook_error() {
        let res = Executor::new().run_post_command("exit 3", &vars()).await;
        assert!(
            matches!(&res, Err(CoreError::Hook(_))),
            "unexpected result: {res:?}"
        );
    }
}
