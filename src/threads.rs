use std::{
    io,
    sync::{mpsc, Arc, Mutex},
    thread,
};

use log::trace;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("worker pool size must be greater than zero")]
    InvalidSize,

    #[error("failed to spawn worker thread: {source}")]
    Spawn { source: io::Error },

    #[error("worker pool is shut down")]
    ShutDown,
}

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed set of worker threads draining a shared job queue.
///
/// `shutdown` stops intake without waiting; dropping the pool joins every
/// worker once the queued jobs have run.
pub struct ThreadPool {
    workers: Vec<Worker>,
    sender: Mutex<Option<mpsc::Sender<Job>>>,
}

impl ThreadPool {
    pub fn new(size: usize) -> Result<ThreadPool, PoolError> {

        if size == 0 { return Err(PoolError::InvalidSize); }

        let mut workers = Vec::with_capacity(size);
        let (sender, receiver) = mpsc::channel();
        let receiver = Arc::new(Mutex::new(receiver));

        for id in 0..size {
            workers.push(Worker::new(id, Arc::clone(&receiver))?);
        }

        Ok(ThreadPool { workers, sender: Mutex::new(Some(sender)) })
    }

    pub fn execute<F>(&self, f: F) -> Result<(), PoolError>
    where F: FnOnce() + Send + 'static, {
        let job = Box::new(f);
        let sender = self.sender.lock().map_err(|_| PoolError::ShutDown)?;
        match sender.as_ref() {
            Some(sender) => sender.send(job).map_err(|_| PoolError::ShutDown),
            None => Err(PoolError::ShutDown),
        }
    }

    //  Closes the queue; workers exit after draining it
    pub fn shutdown(&self) {
        if let Ok(mut sender) = self.sender.lock() {
            drop(sender.take());
        }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();

        for worker in &mut self.workers {
            trace!("Shutting down worker {}", worker.id);
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    trace!("Worker {} panicked", worker.id);
                }
            }
        }
    }
}

struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(id: usize, receiver: Arc<Mutex<mpsc::Receiver<Job>>>) -> Result<Worker, PoolError> {
        let thread = thread::Builder::new()
            .name(format!("worker-{}", id))
            .spawn(move || loop {
                let message = match receiver.lock() {
                    Ok(receiver) => receiver.recv(),
                    Err(_) => break,
                };

                match message {
                    Ok(job) => {
                        trace!("Worker {} got a job.", id);
                        job();
                        trace!("Worker {} finished a job", id);
                    },
                    Err(_) => {
                        trace!("Worker {} shutting down", id);
                        break;
                    }
                }
            })
            .map_err(|source| PoolError::Spawn { source })?;

        Ok(Worker { id, thread: Some(thread) })
    }
}
