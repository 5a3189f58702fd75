use std::ops::{Deref, DerefMut};

use log::warn;

use super::{StoreError, TransitDatabase};

/// Scoped connection to a [`TransitDatabase`].
///
/// Created by [`TransitDatabase::session`]. Dropping the session disconnects
/// and discards anything not yet committed, so early returns through `?`
/// never leave the connection open. Call [`Session::close`] to observe
/// failures while closing.
#[derive(Debug)]
pub struct Session<'db> {
    database: &'db mut TransitDatabase,
}

impl TransitDatabase {
    /// Connect and return a guard that disconnects when dropped.
    ///
    /// Fails with [`StoreError::AlreadyConnected`] if a connection is open.
    pub fn session(&mut self) -> Result<Session<'_>, StoreError> {
        self.connect()?;
        Ok(Session { database: self })
    }
}

impl Session<'_> {
    /// Disconnect now, discarding uncommitted work and reporting close errors.
    pub fn close(self) -> Result<(), StoreError> {
        // `Drop` sees the database disconnected afterwards and does nothing.
        self.database.disconnect()
    }
}

impl Deref for Session<'_> {
    type Target = TransitDatabase;

    fn deref(&self) -> &Self::Target {
        self.database
    }
}

impl DerefMut for Session<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.database
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if !self.database.is_connected() {
            return;
        }
        if let Err(err) = self.database.disconnect() {
            warn!(
                "failed to release transit database session for {}: {err}",
                self.database.path().display()
            );
        }
    }
}
