#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use russh::client::{self, Config};
use russh_keys::key::PublicKey;
use russh_sftp::client::SftpSession;
use sftp_check::{host_key::ExpectedHostKey, CheckConfig};
use testcontainers::{
    core::{ContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};
use uuid::Uuid;

pub const USERNAME: &str = "monitor";
pub const PASSWORD: &str = "monitor123";
pub const UPLOAD_DIR: &str = "/upload";

pub fn get_missing_path() -> String {
    format!("{}/{}", UPLOAD_DIR, Uuid::new_v4())
}

pub struct TestServer {
    pub port: u16,
    pub sftp: SftpSession,
    pub host_key: PublicKey,
    _ssh: client::Handle<RecordingHandler>,
    _container: ContainerAsync<GenericImage>,
}

impl TestServer {
    pub async fn setup() -> TestServer {
        let container = GenericImage::new("atmoz/sftp", "alpine")
            .with_exposed_port(ContainerPort::Tcp(22))
            .with_wait_for(WaitFor::message_on_stderr("Server listening on"))
            .with_cmd([format!("{USERNAME}:{PASSWORD}:::upload")])
            .start()
            .await
            .expect("Could not start SFTP container");
        let ports = container
            .ports()
            .await
            .expect("Could not get SFTP container ports");
        let port = ports
            .map_to_host_port_ipv4(ContainerPort::Tcp(22))
            .expect("Could not get SFTP container port corresponding to 22");
        tokio::time::sleep(Duration::from_millis(100)).await;

        let seen_key = Arc::new(Mutex::new(None));
        let mut handle = client::connect(
            Arc::new(Config::default()),
            ("localhost", port),
            RecordingHandler {
                seen_key: seen_key.clone(),
            },
        )
        .await
        .expect("Could not connect");
        assert!(handle
            .authenticate_password(USERNAME, PASSWORD)
            .await
            .expect("Could not auth"));
        let sftp_chan = handle
            .channel_open_session()
            .await
            .expect("Could not open SFTP channel");
        sftp_chan
            .request_subsystem(true, "sftp")
            .await
            .expect("Could not request SFTP");
        let sftp = SftpSession::new(sftp_chan.into_stream())
            .await
            .expect("Could not open SFTP session");
        let host_key = seen_key
            .lock()
            .unwrap()
            .take()
            .expect("Server key was not presented");

        TestServer {
            port,
            sftp,
            host_key,
            _ssh: handle,
            _container: container,
        }
    }

    pub fn config(&self) -> CheckConfig {
        CheckConfig {
            address: format!("localhost:{}", self.port),
            username: USERNAME.into(),
            password: PASSWORD.into(),
            host_key: ExpectedHostKey::Any,
            file_path: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub async fn init_file(&self, content: &str) -> String {
        let path = get_missing_path();
        self.sftp.create(path.as_str()).await.unwrap();
        self.sftp.write(path.as_str(), content.as_bytes()).await.unwrap();
        path
    }
}

#[derive(Debug)]
pub struct RecordingHandler {
    seen_key: Arc<Mutex<Option<PublicKey>>>,
}

#[async_trait]
impl client::Handler for RecordingHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        *self.seen_key.lock().unwrap() = Some(server_public_key.clone());
        Ok(true)
    }
}
