//! Scripted SMTP peer for integration tests.
//!
//! Speaks just enough plaintext ESMTP for lettre: greeting, EHLO (with
//! `AUTH PLAIN LOGIN`, no STARTTLS), AUTH, MAIL, RCPT, DATA, RSET, NOOP, QUIT.
//! Every session's transcript is kept, including sessions that close right
//! after connecting.

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub commands: Vec<String>,
    pub data: String,
}

#[derive(Clone, Default)]
pub struct FakeSmtpServer {
    sessions: Arc<Mutex<Vec<Session>>>,
}

impl FakeSmtpServer {
    /// Bind on localhost and serve sessions in the background. Returns the port.
    pub async fn start() -> (Self, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = Self::default();

        let handle = server.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let handle = handle.clone();
                tokio::spawn(async move {
                    let session = serve(stream).await;
                    handle.sessions.lock().unwrap().push(session);
                });
            }
        });

        (server, port)
    }

    /// Sessions that have finished.
    pub fn sessions(&self) -> Vec<Session> {
        self.sessions.lock().unwrap().clone()
    }

    /// Sessions in which the client spoke at least one command.
    pub async fn smtp_sessions(&self, expected: usize) -> Vec<Session> {
        for _ in 0..100 {
            let sessions: Vec<Session> = self
                .sessions()
                .into_iter()
                .filter(|s| !s.commands.is_empty())
                .collect();
            if sessions.len() >= expected {
                return sessions;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        panic!("expected {} SMTP sessions, got {:?}", expected, self.sessions());
    }
}

async fn serve(stream: TcpStream) -> Session {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();
    let mut session = Session::default();

    if write.write_all(b"220 fake.test ESMTP ready\r\n").await.is_err() {
        return session;
    }

    let mut in_data = false;
    while let Ok(Some(line)) = lines.next_line().await {
        if in_data {
            if line == "." {
                in_data = false;
                if write.write_all(b"250 2.0.0 queued\r\n").await.is_err() {
                    break;
                }
            } else {
                session.data.push_str(&line);
                session.data.push('\n');
            }
            continue;
        }

        session.commands.push(line.clone());
        let verb = line
            .split(|c: char| c == ' ' || c == ':')
            .next()
            .unwrap_or("")
            .to_uppercase();

        let reply: &[u8] = match verb.as_str() {
            "EHLO" => b"250-fake.test\r\n250-AUTH PLAIN LOGIN\r\n250 8BITMIME\r\n",
            "HELO" => b"250 fake.test\r\n",
            "AUTH" => b"235 2.7.0 authenticated\r\n",
            "MAIL" | "RCPT" | "RSET" | "NOOP" => b"250 2.1.0 ok\r\n",
            "DATA" => {
                in_data = true;
                b"354 go ahead\r\n"
            }
            "QUIT" => {
                let _ = write.write_all(b"221 2.0.0 bye\r\n").await;
                break;
            }
            _ => b"502 5.5.2 not implemented\r\n",
        };
        if write.write_all(reply).await.is_err() {
            break;
        }
    }

    session
}
