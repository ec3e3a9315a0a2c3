//! `EventStore` en fichero JSON lines: un `RunEvent` serializado por línea.
//!
//! El orden (`seq`) y el timestamp los asigna el store en memoria subyacente;
//! el fichero es una copia append-only para diagnóstico y replay posterior.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use drp_core::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
use log::{debug, error};
use uuid::Uuid;

use crate::error::PersistenceError;

#[derive(Debug)]
pub struct JsonlEventStore {
    path: PathBuf,
    file: File,
    inner: InMemoryEventStore,
    write_errors: usize,
}

impl JsonlEventStore {
    /// Abre (o crea) el fichero en modo append.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!("event_store:open {}", path.display());
        Ok(Self { path,
                  file,
                  inner: InMemoryEventStore::default(),
                  write_errors: 0 })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Eventos que no pudieron escribirse en disco (siguen en memoria).
    pub fn write_errors(&self) -> usize {
        self.write_errors
    }

    fn write_line(&mut self, ev: &RunEvent) -> Result<(), PersistenceError> {
        let mut line = serde_json::to_string(ev)?;
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        Ok(())
    }
}

impl EventStore for JsonlEventStore {
    fn append_kind(&mut self, run_id: Uuid, kind: RunEventKind) -> RunEvent {
        let ev = self.inner.append_kind(run_id, kind);
        if let Err(e) = self.write_line(&ev) {
            self.write_errors += 1;
            error!("event_store:write error path={} seq={} err={e}", self.path.display(), ev.seq);
        }
        ev
    }

    fn list(&self, run_id: Uuid) -> Vec<RunEvent> {
        self.inner.list(run_id)
    }
}

/// Lee todos los eventos de un fichero JSON lines, en orden de escritura.
pub fn read_events(path: &Path) -> Result<Vec<RunEvent>, PersistenceError> {
    let reader = BufReader::new(File::open(path)?);
    let mut events = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        events.push(serde_json::from_str(&line)?);
    }
    Ok(events)
}
