use crate::draw::surface::CanvasSurface;
use anyhow::{anyhow, Context, Result};

/// One encoded canvas state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    png: Vec<u8>,
}

impl Snapshot {
    pub fn capture(surface: &CanvasSurface) -> Result<Self> {
        let png = surface.encode_png().context("serialize canvas snapshot")?;
        Ok(Self { png })
    }

    pub fn from_png(png: Vec<u8>) -> Self {
        Self { png }
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }
}

/// Linear undo over canvas snapshots. `cursor` always points at a valid
/// snapshot once the stack is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryStack {
    snapshots: Vec<Snapshot>,
    cursor: Option<usize>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.cursor.and_then(|idx| self.snapshots.get(idx))
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(idx) if idx > 0)
    }

    /// Encodes the surface and pushes it after the cursor, dropping anything
    /// that had been undone. The stack is untouched if encoding fails.
    pub fn snapshot(&mut self, surface: &CanvasSurface) -> Result<usize> {
        let snapshot = Snapshot::capture(surface)?;
        Ok(self.push(snapshot))
    }

    pub fn push(&mut self, snapshot: Snapshot) -> usize {
        let keep = self.cursor.map(|idx| idx + 1).unwrap_or(0);
        self.snapshots.truncate(keep);
        self.snapshots.push(snapshot);
        let idx = self.snapshots.len() - 1;
        self.cursor = Some(idx);
        idx
    }

    /// Steps back one state and restores it into `surface`. Returns `Ok(false)`
    /// when there is nothing to undo. A snapshot that cannot be restored leaves
    /// both the surface and the cursor unchanged.
    pub fn undo(&mut self, surface: &mut CanvasSurface) -> Result<bool> {
        let Some(idx) = self.cursor else {
            return Ok(false);
        };
        if idx == 0 {
            return Ok(false);
        }
        let target = idx - 1;
        let snapshot = self
            .snapshots
            .get(target)
            .ok_or_else(|| anyhow!("undo target {target} missing from history"))?;
        surface
            .restore_png(snapshot.png())
            .with_context(|| format!("restore history snapshot {target}"))?;
        self.cursor = Some(target);
        Ok(true)
    }
}
