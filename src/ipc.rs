//! IPC (CLI surface, §6): `pytylectl` sends one newline-terminated
//! action string to `pytyled` over a Unix domain socket. The exact wire
//! format is left open by the external-interfaces section beyond "some
//! transport exists"; this crate takes the simplest workable shape and
//! keeps the World Model mutation itself on the Scheduler's own thread
//! (§5) by having the listener only ever forward strings across a
//! channel rather than touching the world model directly.
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use crate::error::Result;

/// `$XDG_RUNTIME_DIR/pytyle.sock`, falling back to `/tmp/pytyle.sock`
/// when the variable is unset.
pub fn socket_path() -> PathBuf {
    match std::env::var_os("XDG_RUNTIME_DIR") {
        Some(dir) => Path::new(&dir).join("pytyle.sock"),
        None => PathBuf::from("/tmp/pytyle.sock"),
    }
}

/// The daemon side. Binds the socket (removing a stale one left behind
/// by a previous crashed run) and accepts connections on a background
/// thread, one per client, each forwarding the lines it reads onto a
/// single channel the Scheduler drains every loop iteration.
pub struct Listener {
    rx: Receiver<String>,
}

impl Listener {
    pub fn bind(path: &Path) -> Result<Self> {
        if path.exists() {
            let _ = std::fs::remove_file(path);
        }
        let listener = UnixListener::bind(path)?;
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let tx = tx.clone();
                thread::spawn(move || serve_one(stream, tx));
            }
        });

        Ok(Self { rx })
    }

    /// Every action string received since the last call, without
    /// blocking. Called once per Scheduler iteration.
    pub fn drain(&self) -> Vec<String> {
        self.rx.try_iter().collect()
    }
}

fn serve_one(stream: UnixStream, tx: mpsc::Sender<String>) {
    let reader = BufReader::new(stream);
    for line in reader.lines().map_while(std::result::Result::ok) {
        let action = line.trim().to_string();
        if !action.is_empty() && tx.send(action).is_err() {
            break;
        }
    }
}

/// The client side: connect, send one action, disconnect. Per §6, exit
/// code 0 on success and non-zero on connection failure — callers
/// propagate this `Result` straight into `pytylectl`'s exit code.
pub fn send_action(path: &Path, action: &str) -> Result<()> {
    let mut stream = UnixStream::connect(path)?;
    writeln!(stream, "{action}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn falls_back_to_tmp_without_xdg_runtime_dir() {
        // `env::var_os`/`set_var` are process-global; route through one
        // guarded scope rather than risk interleaving with other tests.
        let prior = std::env::var_os("XDG_RUNTIME_DIR");
        std::env::remove_var("XDG_RUNTIME_DIR");
        assert_eq!(socket_path(), PathBuf::from("/tmp/pytyle.sock"));
        if let Some(dir) = prior {
            std::env::set_var("XDG_RUNTIME_DIR", dir);
        }
    }

    #[test]
    fn one_action_sent_is_the_one_action_drained() {
        let dir = std::env::temp_dir().join(format!("pytyle-ipc-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.sock");
        let listener = Listener::bind(&path).unwrap();

        send_action(&path, "tile").unwrap();

        for _ in 0..200 {
            let drained = listener.drain();
            if !drained.is_empty() {
                assert_eq!(drained, vec!["tile".to_string()]);
                let _ = std::fs::remove_file(&path);
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        let _ = std::fs::remove_file(&path);
        panic!("action was never received over the socket");
    }
}
