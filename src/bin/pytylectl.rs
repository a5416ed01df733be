//! The client: send one action name to a running `pytyled` and exit.
use std::{env, process};

use pytyle::ipc;

fn main() {
    let mut args = env::args().skip(1);
    let Some(action) = args.next() else {
        eprintln!("usage: pytylectl <action>");
        process::exit(1);
    };

    let path = ipc::socket_path();
    match ipc::send_action(&path, &action) {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("pytylectl: could not reach pytyled at {}: {e}", path.display());
            process::exit(1);
        }
    }
}
