//! Server-side scroll registrations over result cursors.
//!
//! A scroll hands out `batch_size` extracted items per call. When the
//! underlying cursor runs dry it is closed right away, but the registration
//! stays until the next call, which returns an empty page and drops it. A
//! caller therefore always sees the end of data as an empty page; only a
//! later call gets `NotFound`.

use std::collections::HashMap;
use std::iter::Peekable;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use chrono::Duration;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, warn};
use uuid::Uuid;
use crate::core::config::{CursorConfig, EngineConfig};
use crate::core::error::{Error, ErrorKind, Result};
use crate::search::clock::{Clock, SystemClock};
use crate::search::results::ScrollResult;

/// Raw result cursor owned by a scroll registration.
pub trait Cursor: Send {
    type Item;

    fn has_next(&mut self) -> bool;
    fn next(&mut self) -> Option<Self::Item>;
    fn close(&mut self);
}

/// Cursor over any iterator. Closing drops the remaining items.
pub struct IterCursor<I: Iterator> {
    iter: Option<Peekable<I>>,
}

impl<I: Iterator> IterCursor<I> {
    pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
        IterCursor {
            iter: Some(iter.into_iter().peekable()),
        }
    }
}

impl<I: Iterator + Send> Cursor for IterCursor<I>
where
    I::Item: Send,
{
    type Item = I::Item;

    fn has_next(&mut self) -> bool {
        self.iter.as_mut().is_some_and(|it| it.peek().is_some())
    }

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.as_mut().and_then(|it| it.next())
    }

    fn close(&mut self) {
        self.iter = None;
    }
}

/// Turns a raw cursor item into a result row.
pub type Extractor<T, R> = Arc<dyn Fn(T) -> Result<R> + Send + Sync>;

type BoxedCursor<T> = Box<dyn Cursor<Item = T>>;

struct Registration<T> {
    batch_size: usize,
    keep_alive: Duration,
    last_access_ms: AtomicI64,
    /// `None` once the cursor has been closed.
    cursor: Mutex<Option<BoxedCursor<T>>>,
}

impl<T> Registration<T> {
    fn is_expired(&self, now_ms: i64) -> bool {
        now_ms - self.last_access_ms.load(Ordering::Acquire) > self.keep_alive.num_milliseconds()
    }

    fn touch(&self, now_ms: i64) {
        self.last_access_ms.store(now_ms, Ordering::Release);
    }

    /// Closes the cursor if still open. Returns whether it was.
    fn close(&self) -> bool {
        match self.cursor.lock().take() {
            Some(mut cursor) => {
                cursor.close();
                true
            }
            None => false,
        }
    }
}

/// Scroll registry with keep-alive expiry.
///
/// Scrolls on different ids run in parallel; scrolls on one id are
/// serialized by the registration's own lock.
pub struct CursorService<T, R> {
    registrations: RwLock<HashMap<String, Arc<Registration<T>>>>,
    extractor: Extractor<T, R>,
    clock: Arc<dyn Clock>,
    config: CursorConfig,
}

impl<T: 'static, R> CursorService<T, R> {
    pub fn new(extractor: Extractor<T, R>) -> Self {
        Self::with_clock(extractor, CursorConfig::default(), Arc::new(SystemClock))
    }

    /// Service using the cursor defaults of an engine configuration.
    pub fn from_config(extractor: Extractor<T, R>, config: &EngineConfig) -> Self {
        Self::with_clock(extractor, config.cursor.clone(), Arc::new(SystemClock))
    }

    pub fn with_clock(extractor: Extractor<T, R>, config: CursorConfig, clock: Arc<dyn Clock>) -> Self {
        CursorService {
            registrations: RwLock::new(HashMap::new()),
            extractor,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &CursorConfig {
        &self.config
    }

    /// Registers a cursor under a fresh random scroll id.
    pub fn register_cursor(
        &self,
        cursor: impl Cursor<Item = T> + 'static,
        batch_size: Option<usize>,
        keep_alive_secs: Option<u64>,
    ) -> Result<String> {
        let scroll_id = Uuid::new_v4().to_string();
        self.register_cursor_with_id(&scroll_id, cursor, batch_size, keep_alive_secs)?;
        Ok(scroll_id)
    }

    /// Registers a cursor under a caller-chosen id. Zero or absent batch size
    /// and keep-alive fall back to the configured defaults.
    pub fn register_cursor_with_id(
        &self,
        scroll_id: &str,
        cursor: impl Cursor<Item = T> + 'static,
        batch_size: Option<usize>,
        keep_alive_secs: Option<u64>,
    ) -> Result<()> {
        let batch_size = batch_size.filter(|&b| b > 0).unwrap_or(self.config.default_batch_size);
        let keep_alive_secs = keep_alive_secs
            .filter(|&k| k > 0)
            .unwrap_or(self.config.default_keep_alive_secs);
        let keep_alive_secs = i64::try_from(keep_alive_secs).map_err(|_| {
            Error::new(ErrorKind::InvalidArgument, format!("Keep-alive too large: {}", keep_alive_secs))
        })?;
        let registration = Arc::new(Registration {
            batch_size: batch_size.max(1),
            keep_alive: Duration::seconds(keep_alive_secs),
            last_access_ms: AtomicI64::new(self.now_ms()),
            cursor: Mutex::new(Some(Box::new(cursor) as BoxedCursor<T>)),
        });

        let previous = self.registrations.write().insert(scroll_id.to_string(), registration);
        if let Some(previous) = previous {
            previous.close();
            warn!(scroll_id = %scroll_id, "replaced existing scroll registration");
        }
        debug!(scroll_id = %scroll_id, batch_size = batch_size, "registered cursor");
        Ok(())
    }

    /// Next page of results for `scroll_id`.
    pub fn scroll(&self, scroll_id: &str) -> Result<ScrollResult<R>> {
        let registration = self
            .registrations
            .read()
            .get(scroll_id)
            .cloned()
            .ok_or_else(|| Error::new(ErrorKind::NotFound, format!("Unknown scroll id: {}", scroll_id)))?;

        let now_ms = self.now_ms();
        if registration.is_expired(now_ms) {
            self.remove(scroll_id, &registration);
            return Err(Error::new(ErrorKind::Expired, format!("Timed out scroll id: {}", scroll_id)));
        }
        registration.touch(now_ms);

        let mut guard = registration.cursor.lock();
        let Some(cursor) = guard.as_mut() else {
            drop(guard);
            self.remove(scroll_id, &registration);
            debug!(scroll_id = %scroll_id, "scroll finished");
            return Ok(ScrollResult::empty(scroll_id));
        };

        let mut results = Vec::with_capacity(registration.batch_size);
        while results.len() < registration.batch_size && cursor.has_next() {
            let Some(item) = cursor.next() else {
                break;
            };
            match (self.extractor)(item) {
                Ok(row) => results.push(row),
                Err(err) => error!(scroll_id = %scroll_id, error = %err, "skipping item that failed extraction"),
            }
        }

        if !cursor.has_next() {
            cursor.close();
            *guard = None;
            if results.is_empty() {
                drop(guard);
                self.remove(scroll_id, &registration);
                debug!(scroll_id = %scroll_id, "scroll finished");
            }
        }
        Ok(ScrollResult {
            scroll_id: scroll_id.to_string(),
            results,
        })
    }

    /// Drops a registration and closes its cursor. Returns false for an
    /// unknown id.
    pub fn unregister_cursor(&self, scroll_id: &str) -> bool {
        match self.registrations.write().remove(scroll_id) {
            Some(registration) => {
                registration.close();
                true
            }
            None => false,
        }
    }

    /// Drops every registration.
    pub fn clear(&self) {
        let drained: Vec<_> = self.registrations.write().drain().collect();
        for (_, registration) in drained {
            registration.close();
        }
    }

    /// Evicts registrations whose keep-alive elapsed. Returns whether any
    /// were evicted.
    pub fn check_for_timed_out_scroll(&self) -> bool {
        let now_ms = self.now_ms();
        let expired: Vec<(String, Arc<Registration<T>>)> = {
            let mut registrations = self.registrations.write();
            let ids: Vec<String> = registrations
                .iter()
                .filter(|(_, r)| r.is_expired(now_ms))
                .map(|(id, _)| id.clone())
                .collect();
            ids.into_iter()
                .filter_map(|id| registrations.remove(&id).map(|r| (id, r)))
                .collect()
        };
        for (scroll_id, registration) in &expired {
            registration.close();
            warn!(scroll_id = %scroll_id, "scroll timed out");
        }
        !expired.is_empty()
    }

    pub fn len(&self) -> usize {
        self.registrations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.read().is_empty()
    }

    pub fn contains(&self, scroll_id: &str) -> bool {
        self.registrations.read().contains_key(scroll_id)
    }

    fn now_ms(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }

    /// Removes `scroll_id` only if it still maps to `registration`, so a
    /// concurrent re-registration under the same id survives.
    fn remove(&self, scroll_id: &str, registration: &Arc<Registration<T>>) {
        let mut registrations = self.registrations.write();
        if registrations.get(scroll_id).is_some_and(|r| Arc::ptr_eq(r, registration)) {
            registrations.remove(scroll_id);
        }
        drop(registrations);
        registration.close();
    }
}
