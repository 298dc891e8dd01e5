//! End-to-end tests of the lettre transport against a scripted SMTP peer.

mod support;

use courier::{ErrorKind, Mailer, MessageData, SmtpSettings};
use std::time::Duration;
use support::FakeSmtpServer;

fn local(port: u16) -> SmtpSettings {
    SmtpSettings::new("127.0.0.1", port)
        .local_identity("courier.test")
        .send_timeout(Duration::from_secs(10))
}

#[tokio::test]
async fn test_credentials_never_sent_in_cleartext() {
    let (server, port) = FakeSmtpServer::start().await;
    let mailer = Mailer::smtp(local(port).credentials("sender@example.com", "secret"));

    let err = mailer
        .send(&["ada@example.com"], "Hi", "<p>Hi</p>", &MessageData::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);

    let sessions = server.smtp_sessions(1).await;
    let commands = &sessions[0].commands;

    assert_eq!(commands[0], "EHLO courier.test");
    assert!(!commands.iter().any(|c| c.starts_with("AUTH")));
    assert!(!commands.iter().any(|c| c.starts_with("MAIL")));
    assert!(sessions[0].data.is_empty());
}

#[tokio::test]
async fn test_unauthenticated_send() {
    let (server, port) = FakeSmtpServer::start().await;
    let mailer = Mailer::smtp(local(port).from_address("noreply@example.com"));

    mailer
        .send(
            &["ada@example.com", "grace@example.com"],
            "Welcome, {{.Name}}!",
            "<h1>Hello Ada</h1>",
            &MessageData::new("Ada"),
        )
        .await
        .unwrap();

    let sessions = server.smtp_sessions(1).await;
    let commands = &sessions[0].commands;

    assert_eq!(commands[0], "EHLO courier.test");
    assert!(!commands.iter().any(|c| c.starts_with("AUTH")));
    assert!(commands.iter().any(|c| c.starts_with("MAIL FROM:<noreply@example.com>")));

    let rcpts: Vec<&String> = commands.iter().filter(|c| c.starts_with("RCPT TO:")).collect();
    assert_eq!(rcpts.len(), 2);
    assert!(rcpts[0].starts_with("RCPT TO:<ada@example.com>"));
    assert!(rcpts[1].starts_with("RCPT TO:<grace@example.com>"));
    assert_eq!(commands.last().map(String::as_str), Some("QUIT"));

    assert!(sessions[0].data.contains("Subject: Welcome, Ada!"));
    assert!(sessions[0].data.contains("<h1>Hello Ada</h1>"));
}

#[tokio::test]
async fn test_connection_check_dials_without_mail() {
    let (server, port) = FakeSmtpServer::start().await;
    let mailer = Mailer::smtp(local(port));

    mailer.test_connection().await.unwrap();

    let sessions = server.smtp_sessions(1).await;
    let commands = &sessions[0].commands;

    assert_eq!(commands.first().map(String::as_str), Some("EHLO courier.test"));
    assert_eq!(commands.last().map(String::as_str), Some("QUIT"));
    assert!(!commands.iter().any(|c| c.starts_with("AUTH")));
    assert!(!commands.iter().any(|c| c.starts_with("MAIL") || c.starts_with("DATA")));
}

#[tokio::test]
async fn test_connection_check_with_credentials_needs_tls() {
    let (_server, port) = FakeSmtpServer::start().await;
    let mailer = Mailer::smtp(local(port).credentials("sender@example.com", "secret"));

    let err = mailer.test_connection().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(err.to_string().contains("STARTTLS"));
}

#[tokio::test]
async fn test_probe_and_send_on_refused_port() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mailer = Mailer::smtp(local(port).connect_timeout(Duration::from_secs(2)));

    let probe = mailer.test_connection().await.unwrap_err();
    assert_eq!(probe.kind(), ErrorKind::Connection);

    let send = mailer
        .send(&["ada@example.com"], "Hi", "", &MessageData::default())
        .await
        .unwrap_err();
    let buffered = mailer
        .send_buffered(&["ada@example.com"], "Hi", "", &MessageData::default())
        .await
        .unwrap_err();
    assert_eq!(send.kind(), buffered.kind());
}
