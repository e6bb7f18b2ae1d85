use std::borrow::Cow;

use testcontainers::core::{CmdWaitFor, ExecCommand, WaitFor};
use testcontainers::{Container, Image};

#[derive(Debug, Default, Clone)]
struct PureFtpImage {
    _priv: (),
}

impl Image for PureFtpImage {
    fn name(&self) -> &str {
        "stilliard/pure-ftpd"
    }

    fn tag(&self) -> &str {
        "latest"
    }

    fn ready_conditions(&self) -> Vec<WaitFor> {
        vec![WaitFor::message_on_stdout("Starting Pure-FTPd")]
    }

    fn env_vars(
        &self,
    ) -> impl IntoIterator<Item = (impl Into<Cow<'_, str>>, impl Into<Cow<'_, str>>)> {
        vec![
            ("PUBLICHOST", "localhost"),
            ("FTP_USER_NAME", "test"),
            ("FTP_USER_PASS", "test"),
            ("FTP_USER_HOME", "/home/test"),
        ]
    }
}

/// Pure-FTPd server in docker, with user `test:test` and a `readme.txt` in its home
pub struct SyncPureFtpRunner {
    container: Container<PureFtpImage>,
}

impl SyncPureFtpRunner {
    pub fn start() -> Self {
        use testcontainers::runners::SyncRunner;
        let container = PureFtpImage::default()
            .start()
            .expect("Failed to start container");

        let resp = container
            .exec(
                ExecCommand::new([
                    "/bin/sh",
                    "-c",
                    "echo hello > /home/test/readme.txt && chown -R ftpuser:ftpgroup /home/test",
                ])
                .with_cmd_ready_condition(CmdWaitFor::Exit { code: Some(0) }),
            )
            .expect("Failed to create file");
        assert_eq!(
            resp.exit_code()
                .expect("failed to get exit code for readme")
                .expect("no exit code for readme"),
            0
        );

        Self { container }
    }

    pub fn get_ftp_port(&self) -> u16 {
        self.container.get_host_port_ipv4(21).unwrap()
    }
}
