use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::InterruptKind;

/// Ticket for one open interrupt. Closing needs the same ticket back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterruptHandle(u64);

impl fmt::Display for InterruptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InterruptError {
    #[error("interrupt {open} already outstanding")]
    AlreadyOpen { open: InterruptHandle },
    #[error("no interrupt is open")]
    NotOpen,
    #[error("handle {got} does not match open interrupt {expected}")]
    StaleHandle {
        expected: InterruptHandle,
        got: InterruptHandle,
    },
}

/// Single slot through which card, purchase and stock subsystems hold the turn.
#[derive(Debug, Clone, Default)]
pub struct InterruptGateway {
    open: Option<(InterruptHandle, InterruptKind)>,
    issued: u64,
}

impl InterruptGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, kind: InterruptKind) -> Result<InterruptHandle, InterruptError> {
        if let Some((open, _)) = self.open {
            tracing::error!(%open, %kind, "second interrupt opened while one is outstanding");
            return Err(InterruptError::AlreadyOpen { open });
        }
        self.issued += 1;
        let handle = InterruptHandle(self.issued);
        self.open = Some((handle, kind));
        Ok(handle)
    }

    pub fn close(&mut self, handle: InterruptHandle) -> Result<InterruptKind, InterruptError> {
        match self.open {
            None => Err(InterruptError::NotOpen),
            Some((expected, _)) if expected != handle => Err(InterruptError::StaleHandle {
                expected,
                got: handle,
            }),
            Some((_, kind)) => {
                self.open = None;
                Ok(kind)
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn active(&self) -> Option<(InterruptHandle, InterruptKind)> {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CardCategory;

    #[test]
    fn open_then_close_frees_the_slot() {
        let mut gateway = InterruptGateway::new();
        let handle = gateway.open(InterruptKind::StockMarket).unwrap();
        assert!(gateway.is_open());
        assert_eq!(gateway.active(), Some((handle, InterruptKind::StockMarket)));
        assert_eq!(gateway.close(handle).unwrap(), InterruptKind::StockMarket);
        assert!(!gateway.is_open());
    }

    #[test]
    fn second_open_is_refused() {
        let mut gateway = InterruptGateway::new();
        let first = gateway
            .open(InterruptKind::CardDraw(CardCategory::Chance))
            .unwrap();
        let err = gateway.open(InterruptKind::StockMarket).unwrap_err();
        assert_eq!(err, InterruptError::AlreadyOpen { open: first });
        assert_eq!(
            gateway.active(),
            Some((first, InterruptKind::CardDraw(CardCategory::Chance)))
        );
    }

    #[test]
    fn stale_and_unmatched_closes_are_refused() {
        let mut gateway = InterruptGateway::new();
        assert_eq!(
            gateway.close(InterruptHandle(1)).unwrap_err(),
            InterruptError::NotOpen
        );
        let first = gateway.open(InterruptKind::StockMarket).unwrap();
        gateway.close(first).unwrap();
        let second = gateway.open(InterruptKind::StockMarket).unwrap();
        assert_ne!(first, second);
        assert!(matches!(
            gateway.close(first).unwrap_err(),
            InterruptError::StaleHandle { .. }
        ));
        assert!(gateway.close(second).is_ok());
    }
}
