//! Disk scheduler - asynchronous page I/O behind a request queue.
//!
//! The [`DiskScheduler`] owns a worker thread and the [`DiskManager`].
//! Callers enqueue [`DiskRequest`]s and block on the completion channel;
//! requests are served strictly in submission order.

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Result};
use crate::storage::DiskManager;

/// A single page I/O request.
///
/// For a write, `data` holds the bytes to put on disk. For a read, `data` is
/// a page-sized buffer the worker fills. Either way the buffer travels to
/// the worker and comes back through `done` once the I/O has been applied.
pub struct DiskRequest {
    /// Write (`true`) or read (`false`).
    pub is_write: bool,
    /// Page-sized buffer, owned by the request while it is in flight.
    pub data: Box<[u8]>,
    /// Which page to read or write.
    pub page_id: PageId,
    /// Completion channel; the worker sends the buffer back here.
    pub done: mpsc::Sender<Result<Box<[u8]>>>,
}

/// Serializes page I/O onto one background worker thread.
///
/// The queue is the sole ordering mechanism between I/Os: two requests are
/// applied in the order they were scheduled, never reordered.
///
/// Dropping the scheduler hangs up the queue and joins the worker.
pub struct DiskScheduler {
    queue: Option<mpsc::Sender<DiskRequest>>,
    worker: Option<JoinHandle<()>>,
}

impl DiskScheduler {
    pub fn new(disk_manager: DiskManager) -> Self {
        let (queue, requests) = mpsc::channel::<DiskRequest>();
        let worker = thread::spawn(move || Self::run_worker(disk_manager, requests));

        Self {
            queue: Some(queue),
            worker: Some(worker),
        }
    }

    fn run_worker(mut dm: DiskManager, requests: mpsc::Receiver<DiskRequest>) {
        // Exits when every sender is gone (scheduler dropped).
        while let Ok(mut request) = requests.recv() {
            let result = if request.is_write {
                dm.write_page(request.page_id, &request.data)
                    .map(|_| request.data)
            } else {
                dm.read_page(request.page_id, &mut request.data)
                    .map(|_| request.data)
            };
            // The caller may have given up waiting; nothing to do then.
            let _ = request.done.send(result);
        }
    }

    /// Enqueue a request without waiting for it.
    ///
    /// # Errors
    /// Fails only if the worker thread has shut down.
    pub fn schedule(&self, request: DiskRequest) -> Result<()> {
        self.queue
            .as_ref()
            .expect("scheduler queue gone before drop")
            .send(request)
            .map_err(|_| Error::SchedulerShutDown)
    }

    /// Write `data` to `page_id` and wait for the I/O to complete.
    pub fn write_blocking(&self, page_id: PageId, data: &[u8]) -> Result<()> {
        let (done, completion) = mpsc::channel();
        self.schedule(DiskRequest {
            is_write: true,
            data: data.to_vec().into_boxed_slice(),
            page_id,
            done,
        })?;
        completion.recv().map_err(|_| Error::SchedulerShutDown)??;
        Ok(())
    }

    /// Read `page_id` into `out` and wait for the I/O to complete.
    pub fn read_blocking(&self, page_id: PageId, out: &mut [u8]) -> Result<()> {
        let (done, completion) = mpsc::channel();
        self.schedule(DiskRequest {
            is_write: false,
            data: vec![0u8; PAGE_SIZE].into_boxed_slice(),
            page_id,
            done,
        })?;
        let data = completion.recv().map_err(|_| Error::SchedulerShutDown)??;
        out.copy_from_slice(&data);
        Ok(())
    }
}

impl Drop for DiskScheduler {
    fn drop(&mut self) {
        // Hang up the queue so the worker's recv() fails, then join.
        self.queue.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
