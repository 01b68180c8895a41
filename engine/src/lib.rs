pub mod digest;

/// Fixed-capacity circular history of states.
///
/// `push` advances `write_index` before writing, so after any push the most
/// recent state lives at `write_index`. `len` counts valid entries and is
/// capped at `CAP`; once full, each push overwrites the oldest entry.
///
/// The entry at `write_index` is the *current* state. `pop` therefore only
/// succeeds while at least one earlier entry exists (`len > 1`), and yields
/// that earlier entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoRing<T, const CAP: usize> {
    slots: [T; CAP],
    write_index: usize,
    len: usize,
}

impl<T: Clone + Default, const CAP: usize> UndoRing<T, CAP> {
    pub fn new() -> Self {
        const { assert!(CAP > 0, "UndoRing capacity must be non-zero") };
        Self {
            slots: std::array::from_fn(|_| T::default()),
            write_index: 0,
            len: 0,
        }
    }

    /// Rebuilds a ring from its raw parts, e.g. after decoding a save file.
    ///
    /// Returns `None` when the indices could not have been produced by
    /// `push`/`pop`.
    pub fn from_parts(slots: [T; CAP], write_index: usize, len: usize) -> Option<Self> {
        if write_index >= CAP || len > CAP {
            return None;
        }
        Some(Self {
            slots,
            write_index,
            len,
        })
    }

    pub const fn capacity(&self) -> usize {
        CAP
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Raw slot storage, including entries that are no longer reachable.
    pub fn slots(&self) -> &[T; CAP] {
        &self.slots
    }

    pub fn current(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        Some(&self.slots[self.write_index])
    }

    pub fn can_pop(&self) -> bool {
        self.len > 1
    }

    /// Number of consecutive successful pops available right now.
    pub fn depth(&self) -> usize {
        self.len.saturating_sub(1)
    }

    pub fn push(&mut self, state: T) {
        self.write_index = (self.write_index + 1) % CAP;
        if self.len < CAP {
            self.len += 1;
        }
        self.slots[self.write_index] = state;
    }

    pub fn pop(&mut self) -> Option<T> {
        if !self.can_pop() {
            return None;
        }
        let prior = (self.write_index + CAP - 1) % CAP;
        let restored = self.slots[prior].clone();
        self.write_index = prior;
        self.len -= 1;
        Some(restored)
    }

    pub fn clear(&mut self) {
        self.slots = std::array::from_fn(|_| T::default());
        self.write_index = 0;
        self.len = 0;
    }
}

impl<T: Clone + Default, const CAP: usize> Default for UndoRing<T, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

pub trait GameLogic {
    type State;
    type Input;

    fn initial_state(&self) -> Self::State;
    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State;
}

/// Drives a [`GameLogic`] without any presentation layer attached.
#[derive(Debug)]
pub struct HeadlessRunner<G: GameLogic> {
    game: G,
    state: G::State,
    frame: usize,
}

impl<G: GameLogic> HeadlessRunner<G> {
    pub fn new(game: G) -> Self {
        let state = game.initial_state();
        Self {
            game,
            state,
            frame: 0,
        }
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn state(&self) -> &G::State {
        &self.state
    }

    pub fn into_state(self) -> G::State {
        self.state
    }

    pub fn step(&mut self, input: G::Input) -> usize {
        self.state = self.game.step(&self.state, input);
        self.frame += 1;
        self.frame
    }

    pub fn run<I>(&mut self, inputs: I) -> usize
    where
        I: IntoIterator<Item = G::Input>,
    {
        let mut last_frame = self.frame();
        for input in inputs {
            last_frame = self.step(input);
        }
        last_frame
    }

    pub fn reset(&mut self) {
        self.state = self.game.initial_state();
        self.frame = 0;
    }
}
