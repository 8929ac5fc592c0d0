//! Two threads exchanging framed calls over an in-process pipe.
//!
//! Run with:
//!   cargo run --example rpc-echo

use std::sync::Arc;
use std::thread;

use chanwire::frame::SharedChannel;
use chanwire::transport::pipe;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (client_end, server_end) = pipe();
    let client = Arc::new(SharedChannel::from_split(client_end)?);
    let server = SharedChannel::from_split(server_end)?;

    let server_thread = thread::spawn(move || -> Result<(), chanwire::codec::CodecError> {
        loop {
            let (id, text): (u32, String) = match server.receive() {
                Ok(call) => call,
                Err(err) => {
                    eprintln!("server: peer gone ({err})");
                    return Ok(());
                }
            };
            eprintln!("server: call {id}: {text:?}");
            server.send(&(id, text.to_uppercase()))?;
        }
    });

    for (id, text) in ["hello", "framed", "world"].into_iter().enumerate() {
        client.send(&(id as u32, text))?;
        let (reply_id, reply): (u32, String) = client.receive()?;
        println!("reply {reply_id}: {reply}");
    }

    // Dropping the last handle closes the pipe and stops the server loop.
    drop(client);
    server_thread
        .join()
        .map_err(|_| "server thread panicked")??;
    Ok(())
}
