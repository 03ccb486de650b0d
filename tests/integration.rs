//! End-to-end tests driving the chat server over real TCP connections.
//!
//! Each test starts its own server on an ephemeral port with a fresh
//! credential file, then speaks the wire protocol exactly as a client
//! would.

use std::io::Write as _;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use rax_chat_server::Server;
use rax_chat_server::config::ServerConfig;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Starts a server on an ephemeral port with the standard test users.
async fn start_test_server() -> SocketAddr {
    let mut credentials = tempfile::NamedTempFile::new().unwrap();
    credentials
        .write_all(b"alice:pw1\nbob:pw2\ncarol:pw3\n")
        .unwrap();

    let config = ServerConfig {
        bind_address: "127.0.0.1".to_string(),
        port: 0,
        credentials_file: credentials.path().to_string_lossy().into_owned(),
        max_command_length: 1024,
    };

    // The credential file is read inside `Server::new`, so the tempfile
    // may be dropped as soon as this function returns.
    let server = Server::new(config).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(async move { server.start().await });
    addr
}

struct TestClient {
    stream: TcpStream,
    buffer: String,
}

impl TestClient {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = timeout(RECV_TIMEOUT, TcpStream::connect(addr))
            .await
            .expect("timed out connecting")
            .expect("failed to connect");
        Self {
            stream,
            buffer: String::new(),
        }
    }

    /// Connects and walks through the authentication exchange.
    async fn login(addr: SocketAddr, username: &str, password: &str) -> Self {
        let mut client = Self::connect(addr).await;
        client.expect("Enter username: ").await;
        client.send_line(username).await;
        client.expect("Enter password: ").await;
        client.send_line(password).await;
        client.expect("Welcome to the chat server!\n").await;
        client
    }

    async fn send_line(&mut self, line: &str) {
        self.stream
            .write_all(format!("{line}\n").as_bytes())
            .await
            .unwrap();
        self.stream.flush().await.unwrap();
    }

    /// Reads until `needle` appears and returns everything up to and
    /// including it; later calls continue right after the match.
    async fn expect(&mut self, needle: &str) -> String {
        loop {
            if let Some(pos) = self.buffer.find(needle) {
                let end = pos + needle.len();
                return self.buffer.drain(..end).collect();
            }

            let mut chunk = [0u8; 1024];
            let n = timeout(RECV_TIMEOUT, self.stream.read(&mut chunk))
                .await
                .unwrap_or_else(|_| {
                    panic!("timed out waiting for {needle:?}; received {:?}", self.buffer)
                })
                .expect("read failed");
            assert!(
                n > 0,
                "connection closed while waiting for {needle:?}; received {:?}",
                self.buffer
            );
            self.buffer
                .push_str(&String::from_utf8_lossy(&chunk[..n]));
        }
    }

    /// Reads until the server closes the connection.
    async fn expect_close(&mut self) {
        loop {
            let mut chunk = [0u8; 1024];
            let n = timeout(RECV_TIMEOUT, self.stream.read(&mut chunk))
                .await
                .expect("timed out waiting for close")
                .expect("read failed");
            if n == 0 {
                return;
            }
            self.buffer
                .push_str(&String::from_utf8_lossy(&chunk[..n]));
        }
    }
}

#[tokio::test]
async fn test_login_and_exit() {
    let addr = start_test_server().await;

    let mut alice = TestClient::login(addr, "alice", "pw1").await;
    alice.send_line("exit").await;
    alice.expect("Goodbye.\n").await;
    alice.expect_close().await;
}

#[tokio::test]
async fn test_authentication_failure_closes_connection() {
    let addr = start_test_server().await;

    let mut client = TestClient::connect(addr).await;
    client.expect("Enter username: ").await;
    client.send_line("alice").await;
    client.expect("Enter password: ").await;
    client.send_line("wrong").await;
    client.expect("Error: Authentication failed.\n").await;
    client.expect_close().await;

    // Unknown users fail the same way.
    let mut client = TestClient::connect(addr).await;
    client.expect("Enter username: ").await;
    client.send_line("ghost").await;
    client.expect("Enter password: ").await;
    client.send_line("pw1").await;
    client.expect("Error: Authentication failed.\n").await;
    client.expect_close().await;
}

#[tokio::test]
async fn test_duplicate_login_rejected() {
    let addr = start_test_server().await;

    let mut alice = TestClient::login(addr, "alice", "pw1").await;

    // Correct password, but the username is already in session.
    let mut imposter = TestClient::connect(addr).await;
    imposter.expect("Enter username: ").await;
    imposter.send_line("alice").await;
    imposter.expect("Enter password: ").await;
    imposter.send_line("pw1").await;
    imposter
        .expect("Error: User \"alice\" is already connected.\n")
        .await;
    imposter.expect_close().await;

    // The original session is unaffected.
    alice.send_line("exit").await;
    alice.expect("Goodbye.\n").await;
}

#[tokio::test]
async fn test_join_and_leave_announcements() {
    let addr = start_test_server().await;

    let mut alice = TestClient::login(addr, "alice", "pw1").await;
    let mut bob = TestClient::login(addr, "bob", "pw2").await;
    alice.expect("bob has joined the chat.\n").await;

    bob.send_line("exit").await;
    bob.expect("Goodbye.\n").await;
    bob.expect_close().await;
    alice.expect("bob has left the chat.\n").await;
}

#[tokio::test]
async fn test_direct_messages() {
    let addr = start_test_server().await;

    let mut alice = TestClient::login(addr, "alice", "pw1").await;
    let mut bob = TestClient::login(addr, "bob", "pw2").await;

    alice.send_line("/msg bob hello there").await;
    bob.expect("[alice]: hello there\n").await;

    alice.send_line("/msg alice hi").await;
    alice
        .expect("Error: Cannot send a private message to yourself.\n")
        .await;

    alice.send_line("/msg ghost hi").await;
    alice.expect("Error: User \"ghost\" not found.\n").await;

    alice.send_line("/msg bob").await;
    alice
        .expect("Error: Incorrect format. Use: /msg <username> <message>\n")
        .await;

    alice.send_line("/msg bob ").await;
    alice
        .expect("Error: Private message content is empty.\n")
        .await;
}

#[tokio::test]
async fn test_broadcast_reaches_everyone_but_sender() {
    let addr = start_test_server().await;

    let mut alice = TestClient::login(addr, "alice", "pw1").await;
    let mut bob = TestClient::login(addr, "bob", "pw2").await;
    let mut carol = TestClient::login(addr, "carol", "pw3").await;

    bob.send_line("/broadcast whatsup").await;
    alice.expect("[bob] (Broadcast): whatsup\n").await;
    carol.expect("[bob] (Broadcast): whatsup\n").await;

    // The broadcast was fanned out before alice ever saw it, so by the
    // time bob receives this marker his queue would already hold any
    // (incorrect) echo of his own broadcast.
    alice.send_line("/msg bob marker").await;
    let received = bob.expect("[alice]: marker\n").await;
    assert!(
        !received.contains("(Broadcast)"),
        "sender received its own broadcast: {received:?}"
    );
}

#[tokio::test]
async fn test_group_messaging() {
    let addr = start_test_server().await;

    let mut alice = TestClient::login(addr, "alice", "pw1").await;
    let mut bob = TestClient::login(addr, "bob", "pw2").await;
    let mut carol = TestClient::login(addr, "carol", "pw3").await;

    alice.send_line("/create_group team").await;
    alice.expect("Group \"team\" created successfully.\n").await;

    bob.send_line("/join_group team").await;
    bob.expect("Joined group \"team\" successfully.\n").await;

    alice.send_line("/group_msg team hello").await;
    bob.expect("[Group team]: hello\n").await;

    // A non-member cannot send, and the members saw nothing from it.
    carol.send_line("/group_msg team sneak").await;
    carol.expect("Error: Not a member of group \"team\".\n").await;

    alice.send_line("/msg bob marker").await;
    let received = bob.expect("[alice]: marker\n").await;
    assert!(
        !received.contains("sneak"),
        "non-member message was delivered: {received:?}"
    );

    // The sender does not receive its own group message.
    bob.send_line("/msg alice marker2").await;
    let received = alice.expect("[bob]: marker2\n").await;
    assert!(
        !received.contains("[Group team]"),
        "sender received its own group message: {received:?}"
    );
}

#[tokio::test]
async fn test_group_error_replies() {
    let addr = start_test_server().await;

    let mut alice = TestClient::login(addr, "alice", "pw1").await;

    alice.send_line("/join_group nowhere").await;
    alice
        .expect("Error: Group \"nowhere\" does not exist.\n")
        .await;

    alice.send_line("/create_group team").await;
    alice.expect("Group \"team\" created successfully.\n").await;

    alice.send_line("/create_group team").await;
    alice.expect("Error: Group \"team\" already exists.\n").await;

    // Creating auto-joined, so a second join is a duplicate.
    alice.send_line("/join_group team").await;
    alice
        .expect("Error: Already a member of group \"team\".\n")
        .await;

    alice.send_line("/leave_group team").await;
    alice.expect("Left group \"team\" successfully.\n").await;

    alice.send_line("/leave_group team").await;
    alice.expect("Error: Not a member of group \"team\".\n").await;

    // The group survives with zero members; sending into it still
    // requires membership.
    alice.send_line("/group_msg team hi").await;
    alice.expect("Error: Not a member of group \"team\".\n").await;

    alice.send_line("/create_group bad name").await;
    alice
        .expect("Error: Group name must not contain spaces.\n")
        .await;

    alice.send_line("/group_msg team").await;
    alice
        .expect("Error: Incorrect format. Use: /group_msg <group name> <message>\n")
        .await;
}

#[tokio::test]
async fn test_unknown_and_empty_input() {
    let addr = start_test_server().await;

    let mut alice = TestClient::login(addr, "alice", "pw1").await;

    alice.send_line("hello everyone").await;
    alice.expect("Error: Unknown command.\n").await;

    alice.send_line("").await;
    alice.expect("Error: Message cannot be empty.\n").await;

    alice.send_line("/broadcast").await;
    alice
        .expect("Error: Incorrect format. Use: /broadcast <message>\n")
        .await;
}

#[tokio::test]
async fn test_abrupt_disconnect_announces_leave() {
    let addr = start_test_server().await;

    let mut alice = TestClient::login(addr, "alice", "pw1").await;
    let bob = TestClient::login(addr, "bob", "pw2").await;
    alice.expect("bob has joined the chat.\n").await;

    // Bob drops the connection without sending `exit`.
    drop(bob);
    alice.expect("bob has left the chat.\n").await;

    // His username is free for a new session again.
    let mut bob = TestClient::login(addr, "bob", "pw2").await;
    alice.expect("bob has joined the chat.\n").await;
    bob.send_line("exit").await;
    bob.expect("Goodbye.\n").await;
}
