//! Chunked inserts inside one transaction.
//!
//! Rows are grouped into savepoints of `chunk_size` rows. Each released
//! savepoint is a cancellation point; the enclosing transaction is never
//! committed by the batch itself, so a cancel or an error rolls back the
//! whole component.

use flo_core::CancelToken;
use rusqlite::{Connection, Params};

use crate::{StoreError, StoreResult};

pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Rows per savepoint; `None` writes the whole component in one chunk.
    pub chunk_size: Option<usize>,
    pub cancel: Option<CancelToken>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            chunk_size: Some(DEFAULT_CHUNK_SIZE),
            cancel: None,
        }
    }
}

impl WriteOptions {
    pub fn with_chunk_size(mut self, chunk_size: Option<usize>) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

pub struct Batch<'c> {
    conn: &'c Connection,
    chunk: usize,
    pending: usize,
    total: usize,
    chunks: usize,
    cancel: Option<CancelToken>,
}

impl<'c> Batch<'c> {
    pub fn begin(conn: &'c Connection, options: &WriteOptions) -> StoreResult<Self> {
        let batch = Self {
            conn,
            chunk: options.chunk_size.unwrap_or(usize::MAX).max(1),
            pending: 0,
            total: 0,
            chunks: 0,
            cancel: options.cancel.clone(),
        };
        batch.check_cancel()?;
        conn.execute_batch("SAVEPOINT chunk")?;
        Ok(batch)
    }

    pub fn conn(&self) -> &'c Connection {
        self.conn
    }

    /// Inserts one row and returns its rowid.
    pub fn insert<P: Params>(&mut self, sql: &str, params: P) -> StoreResult<i64> {
        self.conn.prepare_cached(sql)?.execute(params)?;
        let id = self.conn.last_insert_rowid();
        self.pending += 1;
        self.total += 1;
        if self.pending >= self.chunk {
            self.boundary()?;
        }
        Ok(id)
    }

    fn boundary(&mut self) -> StoreResult<()> {
        self.conn.execute_batch("RELEASE chunk")?;
        self.pending = 0;
        self.chunks += 1;
        tracing::trace!(rows = self.total, chunk = self.chunks, "chunk released");
        self.check_cancel()?;
        self.conn.execute_batch("SAVEPOINT chunk")?;
        Ok(())
    }

    fn check_cancel(&self) -> StoreResult<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(StoreError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Releases the open chunk and returns the number of inserted rows.
    pub fn finish(mut self) -> StoreResult<usize> {
        self.conn.execute_batch("RELEASE chunk")?;
        self.chunks += 1;
        self.check_cancel()?;
        tracing::debug!(rows = self.total, chunks = self.chunks, "batch finished");
        Ok(self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (fid INTEGER PRIMARY KEY, v REAL)")
            .unwrap();
        conn
    }

    #[test]
    fn rows_are_counted_across_chunks() {
        let mut conn = conn();
        let tx = conn.transaction().unwrap();
        let options = WriteOptions::default().with_chunk_size(Some(3));
        let mut batch = Batch::begin(&tx, &options).unwrap();
        for i in 0..10 {
            let id = batch.insert("INSERT INTO t (v) VALUES (?1)", [i as f64]).unwrap();
            assert_eq!(id, i + 1);
        }
        assert_eq!(batch.finish().unwrap(), 10);
        tx.commit().unwrap();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0)).unwrap();
        assert_eq!(n, 10);
    }

    #[test]
    fn cancel_at_chunk_boundary_rolls_back() {
        let mut conn = conn();
        let token = CancelToken::new();
        {
            let tx = conn.transaction().unwrap();
            let options = WriteOptions::default()
                .with_chunk_size(Some(2))
                .with_cancel(token.clone());
            let mut batch = Batch::begin(&tx, &options).unwrap();
            batch.insert("INSERT INTO t (v) VALUES (1.0)", []).unwrap();
            token.cancel();
            let err = batch.insert("INSERT INTO t (v) VALUES (2.0)", []).unwrap_err();
            assert!(matches!(err, StoreError::Cancelled));
        }
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0)).unwrap();
        assert_eq!(n, 0);
    }
}
