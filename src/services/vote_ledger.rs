// src/services/vote_ledger.rs

use crate::models::review::VoteKind;

// Contadores denormalizados da avaliação (helpful_votes / unhelpful_votes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoteCounters {
    pub helpful: i32,
    pub unhelpful: i32,
}

impl VoteCounters {
    pub fn new(helpful: i32, unhelpful: i32) -> Self {
        Self { helpful, unhelpful }
    }

    fn counter_mut(&mut self, kind: VoteKind) -> &mut i32 {
        match kind {
            VoteKind::Helpful => &mut self.helpful,
            VoteKind::Unhelpful => &mut self.unhelpful,
        }
    }

    fn increment(&mut self, kind: VoteKind) {
        *self.counter_mut(kind) += 1;
    }

    // Nunca abaixo de zero, mesmo se o livro e os contadores divergirem
    fn decrement(&mut self, kind: VoteKind) {
        let counter = self.counter_mut(kind);
        *counter = (*counter - 1).max(0);
    }
}

/// O que precisa ser gravado em `review_votes` para o usuário.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerChange {
    Insert(VoteKind),
    Remove,
    Switch(VoteKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTransition {
    pub counters: VoteCounters,
    pub change: LedgerChange,
    /// Voto atual do usuário depois da operação
    pub user_vote: Option<VoteKind>,
}

/// Aplica um voto ao livro:
/// - sem voto anterior: registra e incrementa;
/// - mesmo voto: remove (desfaz) e decrementa;
/// - voto oposto: troca, incrementa o novo e decrementa o antigo.
pub fn apply_vote(
    counters: VoteCounters,
    existing: Option<VoteKind>,
    incoming: VoteKind,
) -> VoteTransition {
    let mut counters = counters;

    match existing {
        None => {
            counters.increment(incoming);
            VoteTransition {
                counters,
                change: LedgerChange::Insert(incoming),
                user_vote: Some(incoming),
            }
        }
        Some(previous) if previous == incoming => {
            counters.decrement(incoming);
            VoteTransition {
                counters,
                change: LedgerChange::Remove,
                user_vote: None,
            }
        }
        Some(previous) => {
            counters.increment(incoming);
            counters.decrement(previous);
            VoteTransition {
                counters,
                change: LedgerChange::Switch(incoming),
                user_vote: Some(incoming),
            }
        }
    }
}
