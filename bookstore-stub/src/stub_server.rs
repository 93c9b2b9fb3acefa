use crate::{
    data::RequestData,
    error::Error,
    runner::{self, Shared},
};
use std::{
    net::{SocketAddr, TcpListener},
    sync::{Arc, Mutex},
    thread::JoinHandle,
};
use tokio::sync::oneshot;

/// Handle to a running stub. Dropping it shuts the server down and joins its thread.
#[derive(Debug)]
pub struct StubServer {
    addr: SocketAddr,
    shared: Arc<Mutex<Shared>>,
    shutdown: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<()>>,
}

impl StubServer {
    /// Bind an ephemeral port on `127.0.0.1` and start serving on a background thread.
    pub fn start() -> Result<Self, Error> {
        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        let shared = Arc::new(Mutex::new(Shared::new()));
        let (shutdown, shutdown_rx) = oneshot::channel();
        let join_handle = runner::start(listener, shared.clone(), shutdown_rx)?;
        tracing::info!(%addr, "bookstore stub listening");

        Ok(Self {
            addr,
            shared,
            shutdown: Some(shutdown),
            join_handle: Some(join_handle),
        })
    }

    /// Base URL to hand to an API client, e.g. `http://127.0.0.1:40123`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Result<Vec<RequestData>, Error> {
        Ok(self.shared.lock()?.interactions.clone())
    }

    pub fn last_request(&self) -> Result<Option<RequestData>, Error> {
        Ok(self.shared.lock()?.interactions.last().cloned())
    }

    pub fn clear_requests(&self) -> Result<(), Error> {
        self.shared.lock()?.interactions.clear();
        Ok(())
    }

    /// Remove every book from the catalogue.
    pub fn empty_catalogue(&self) -> Result<(), Error> {
        self.shared.lock()?.store.clear_books();
        Ok(())
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join_handle) = self.join_handle.take() {
            if join_handle.join().is_err() {
                tracing::error!("bookstore stub thread panicked");
            }
        }
    }
}
