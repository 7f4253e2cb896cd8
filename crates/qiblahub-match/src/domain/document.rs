//! The shared match document and its state transitions.
//!
//! Every transition is pure: it mutates an in-memory `MatchDocument` and
//! reports what happened. Writing the result back to the store is the job of
//! the application layer.

use std::fmt;

use chrono::{DateTime, Utc};
use qiblahub_core::clock::Clock;
use qiblahub_core::error::DomainError;
use qiblahub_core::identity::ParticipantId;
use serde::{Deserialize, Serialize};

use crate::domain::board::{Board, CELL_COUNT, Mark, Winner};

/// The two seats of a match. Seat 1 always plays X, seat 2 always plays O.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Players {
    /// Owner of the match.
    pub player1_id: ParticipantId,
    /// Joiner, absent while the match waits in the lobby.
    pub player2_id: Option<ParticipantId>,
}

/// Lifecycle status stored in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchStatus {
    /// Only player 1 is seated.
    Waiting,
    /// Both players are seated and the game is undecided.
    InProgress,
    /// A line was completed or the board filled up.
    Finished,
}

/// One match as held by the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDocument {
    pub players: Players,
    pub board: Board,
    pub current_player: Mark,
    pub status: MatchStatus,
    pub winner: Winner,
    pub last_move_at: DateTime<Utc>,
}

/// Where a participant stands relative to a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantState {
    /// No document, or the participant holds no role in it.
    NoMatch,
    /// Seated and waiting for an opponent.
    LobbyWaiting,
    /// Playing.
    InProgress,
    /// The game is decided.
    Finished,
}

impl ParticipantState {
    /// Derives the state of `participant` from an optional snapshot.
    #[must_use]
    pub fn derive(document: Option<&MatchDocument>, participant: &ParticipantId) -> Self {
        let Some(document) = document else {
            return Self::NoMatch;
        };
        if document.role_of(participant).is_none() {
            return Self::NoMatch;
        }
        match document.status {
            MatchStatus::Waiting => Self::LobbyWaiting,
            MatchStatus::InProgress => Self::InProgress,
            MatchStatus::Finished => Self::Finished,
        }
    }
}

/// Why a move was turned into a no-op. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "cell", rename_all = "snake_case")]
pub enum MoveRejection {
    /// The actor holds no role in the match.
    NotAParticipant,
    /// The match is waiting for an opponent or already finished.
    NotInProgress,
    /// A winner or draw is already recorded.
    AlreadyDecided,
    /// The cell index is not on the board.
    CellOutOfRange(usize),
    /// The cell already holds a mark.
    CellOccupied(usize),
    /// The actor's role is not `currentPlayer`.
    NotYourTurn,
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAParticipant => f.write_str("not a player in this match"),
            Self::NotInProgress => f.write_str("match is not in progress"),
            Self::AlreadyDecided => f.write_str("game is already decided"),
            Self::CellOutOfRange(cell) => write!(f, "cell {cell} is not on the board"),
            Self::CellOccupied(cell) => write!(f, "cell {cell} is already taken"),
            Self::NotYourTurn => f.write_str("not your turn"),
        }
    }
}

/// What a leave does to the stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveEffect {
    /// Nobody is left; the document must be deleted.
    Delete,
    /// One player remains; the document must be rewritten.
    Update,
}

impl MatchDocument {
    /// A fresh lobby entry owned by `owner`.
    #[must_use]
    pub fn new(owner: ParticipantId, clock: &dyn Clock) -> Self {
        Self {
            players: Players {
                player1_id: owner,
                player2_id: None,
            },
            board: Board::new(),
            current_player: Mark::X,
            status: MatchStatus::Waiting,
            winner: Winner::None,
            last_move_at: clock.now(),
        }
    }

    /// The role `participant` plays, if any.
    #[must_use]
    pub fn role_of(&self, participant: &ParticipantId) -> Option<Mark> {
        if self.players.player1_id == *participant {
            Some(Mark::X)
        } else if self.players.player2_id.as_ref() == Some(participant) {
            Some(Mark::O)
        } else {
            None
        }
    }

    /// Seats `joiner` as player 2 and starts the game.
    ///
    /// Whoever joins last takes seat 2, replacing any earlier joiner. A
    /// decided match stays finished until it is reset.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CannotJoinOwnMatch` if `joiner` is player 1.
    pub fn join(&mut self, joiner: ParticipantId) -> Result<(), DomainError> {
        if self.players.player1_id == joiner {
            return Err(DomainError::CannotJoinOwnMatch);
        }
        self.players.player2_id = Some(joiner);
        if self.winner == Winner::None {
            self.status = MatchStatus::InProgress;
        }
        Ok(())
    }

    /// Plays `cell` for `actor`.
    ///
    /// # Errors
    ///
    /// Returns the first `MoveRejection` that applies; the document is left
    /// untouched in that case.
    pub fn apply_move(
        &mut self,
        actor: &ParticipantId,
        cell: usize,
        clock: &dyn Clock,
    ) -> Result<(), MoveRejection> {
        let role = self.role_of(actor).ok_or(MoveRejection::NotAParticipant)?;
        if self.status != MatchStatus::InProgress {
            return Err(MoveRejection::NotInProgress);
        }
        if self.winner.is_decided() {
            return Err(MoveRejection::AlreadyDecided);
        }
        if cell >= CELL_COUNT {
            return Err(MoveRejection::CellOutOfRange(cell));
        }
        if !self.board.is_open(cell) {
            return Err(MoveRejection::CellOccupied(cell));
        }
        if role != self.current_player {
            return Err(MoveRejection::NotYourTurn);
        }

        self.board.place(cell, role);
        self.winner = self.board.winner();
        self.current_player = role.opponent();
        if self.winner.is_decided() {
            self.status = MatchStatus::Finished;
        }
        self.last_move_at = clock.now_not_before(self.last_move_at);
        Ok(())
    }

    /// Removes `leaver` from the match.
    ///
    /// Player 1 leaving hands seat 1 (and role X) to player 2. Either way the
    /// match returns to the lobby with no winner; the board is kept.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotAParticipant` if `leaver` holds no seat.
    pub fn leave(&mut self, leaver: &ParticipantId) -> Result<LeaveEffect, DomainError> {
        match self.role_of(leaver) {
            None => Err(DomainError::NotAParticipant(leaver.clone())),
            Some(Mark::X) => match self.players.player2_id.take() {
                None => Ok(LeaveEffect::Delete),
                Some(remaining) => {
                    self.players.player1_id = remaining;
                    self.back_to_lobby();
                    Ok(LeaveEffect::Update)
                }
            },
            Some(Mark::O) => {
                self.players.player2_id = None;
                self.back_to_lobby();
                Ok(LeaveEffect::Update)
            }
        }
    }

    /// Starts a new game on the same seats. Status becomes in-progress even
    /// if seat 2 is empty.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotAParticipant` if `actor` holds no seat.
    pub fn reset(&mut self, actor: &ParticipantId, clock: &dyn Clock) -> Result<(), DomainError> {
        if self.role_of(actor).is_none() {
            return Err(DomainError::NotAParticipant(actor.clone()));
        }
        self.board = Board::new();
        self.current_player = Mark::X;
        self.winner = Winner::None;
        self.status = MatchStatus::InProgress;
        self.last_move_at = clock.now_not_before(self.last_move_at);
        Ok(())
    }

    fn back_to_lobby(&mut self) {
        self.status = MatchStatus::Waiting;
        self.winner = Winner::None;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use qiblahub_test_support::{FixedClock, ManualClock};
    use serde_json::json;

    use super::*;

    fn participant(name: &str) -> ParticipantId {
        ParticipantId::new(name).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    fn started() -> MatchDocument {
        let mut document = MatchDocument::new(participant("alice"), &clock());
        document.join(participant("bob")).unwrap();
        document
    }

    #[test]
    fn test_new_match_waits_in_lobby() {
        let document = MatchDocument::new(participant("alice"), &clock());

        assert_eq!(document.status, MatchStatus::Waiting);
        assert_eq!(document.players.player2_id, None);
        assert_eq!(document.current_player, Mark::X);
        assert_eq!(document.winner, Winner::None);
        assert_eq!(document.board, Board::new());
    }

    #[test]
    fn test_document_serializes_with_camel_case_fields() {
        let document = MatchDocument::new(participant("alice"), &clock());

        let json = serde_json::to_value(&document).unwrap();

        assert_eq!(
            json,
            json!({
                "players": { "player1Id": "alice", "player2Id": null },
                "board": [null, null, null, null, null, null, null, null, null],
                "currentPlayer": "X",
                "status": "waiting",
                "winner": "none",
                "lastMoveAt": "2026-01-15T10:00:00Z"
            })
        );
    }

    #[test]
    fn test_join_seats_player_two_and_starts_game() {
        let document = started();

        assert_eq!(document.players.player2_id, Some(participant("bob")));
        assert_eq!(document.status, MatchStatus::InProgress);
        assert_eq!(document.role_of(&participant("bob")), Some(Mark::O));
    }

    #[test]
    fn test_owner_cannot_join_own_match() {
        let mut document = MatchDocument::new(participant("alice"), &clock());

        let result = document.join(participant("alice"));

        assert!(matches!(result, Err(DomainError::CannotJoinOwnMatch)));
        assert_eq!(document.status, MatchStatus::Waiting);
    }

    #[test]
    fn test_later_join_takes_over_seat_two() {
        let mut document = started();

        let result = document.join(participant("carol"));

        assert!(result.is_ok());
        assert_eq!(document.players.player2_id, Some(participant("carol")));
        assert_eq!(document.role_of(&participant("carol")), Some(Mark::O));
        assert_eq!(document.role_of(&participant("bob")), None);
        assert_eq!(document.status, MatchStatus::InProgress);
    }

    #[test]
    fn test_join_into_decided_match_keeps_it_finished() {
        // Arrange
        let mut document = started();
        for (player, cell) in [("alice", 0), ("bob", 3), ("alice", 1), ("bob", 4), ("alice", 2)] {
            document.apply_move(&participant(player), cell, &clock()).unwrap();
        }

        // Act
        document.join(participant("carol")).unwrap();

        // Assert
        assert_eq!(document.players.player2_id, Some(participant("carol")));
        assert_eq!(document.winner, Winner::X);
        assert_eq!(document.status, MatchStatus::Finished);
    }

    #[test]
    fn test_rejoin_by_player_two_is_a_no_op() {
        let mut document = started();
        let before = document.clone();

        document.join(participant("bob")).unwrap();

        assert_eq!(document, before);
    }

    #[test]
    fn test_accepted_move_marks_cell_and_toggles_turn() {
        // Arrange
        let mut document = started();

        // Act
        document.apply_move(&participant("alice"), 0, &clock()).unwrap();

        // Assert
        assert_eq!(document.board.get(0), Some(Mark::X));
        assert_eq!(document.current_player, Mark::O);
        assert_eq!(document.status, MatchStatus::InProgress);
    }

    #[test]
    fn test_move_rejections_leave_document_untouched() {
        let mut document = started();
        document.apply_move(&participant("alice"), 4, &clock()).unwrap();
        let before = document.clone();

        let cases = [
            (participant("carol"), 0, MoveRejection::NotAParticipant),
            (participant("alice"), 0, MoveRejection::NotYourTurn),
            (participant("bob"), 4, MoveRejection::CellOccupied(4)),
            (participant("bob"), 9, MoveRejection::CellOutOfRange(9)),
        ];
        for (actor, cell, expected) in cases {
            assert_eq!(document.apply_move(&actor, cell, &clock()), Err(expected));
            assert_eq!(document, before);
        }
    }

    #[test]
    fn test_move_in_waiting_match_is_rejected() {
        let mut document = MatchDocument::new(participant("alice"), &clock());

        let result = document.apply_move(&participant("alice"), 0, &clock());

        assert_eq!(result, Err(MoveRejection::NotInProgress));
    }

    #[test]
    fn test_completing_a_line_finishes_the_game() {
        // Arrange: X takes 0, 1, 2 while O takes 4, 5.
        let mut document = started();
        let alice = participant("alice");
        let bob = participant("bob");

        // Act
        for (actor, cell) in [(&alice, 0), (&bob, 4), (&alice, 1), (&bob, 5), (&alice, 2)] {
            document.apply_move(actor, cell, &clock()).unwrap();
        }

        // Assert
        assert_eq!(document.winner, Winner::X);
        assert_eq!(document.status, MatchStatus::Finished);
        assert_eq!(
            document.apply_move(&bob, 8, &clock()),
            Err(MoveRejection::NotInProgress)
        );
    }

    #[test]
    fn test_nine_moves_without_line_is_a_draw() {
        // Arrange: ends as X O X / X O O / O X X.
        let mut document = started();
        let alice = participant("alice");
        let bob = participant("bob");
        let plies = [0, 1, 2, 4, 3, 5, 7, 6, 8];

        // Act
        for (turn, cell) in plies.into_iter().enumerate() {
            let actor = if turn % 2 == 0 { &alice } else { &bob };
            document.apply_move(actor, cell, &clock()).unwrap();
        }

        // Assert
        assert!(document.board.is_full());
        assert_eq!(document.winner, Winner::Draw);
        assert_eq!(document.status, MatchStatus::Finished);
    }

    #[test]
    fn test_last_move_at_never_goes_backwards() {
        // Arrange
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let mut document = MatchDocument::new(participant("alice"), &clock);
        document.join(participant("bob")).unwrap();

        // Act
        clock.advance(Duration::minutes(-5));
        document.apply_move(&participant("alice"), 0, &clock).unwrap();

        // Assert
        assert_eq!(document.last_move_at, start);
    }

    #[test]
    fn test_sole_player_leaving_deletes() {
        let mut document = MatchDocument::new(participant("alice"), &clock());

        let effect = document.leave(&participant("alice")).unwrap();

        assert_eq!(effect, LeaveEffect::Delete);
    }

    #[test]
    fn test_owner_leaving_promotes_player_two_and_keeps_board() {
        // Arrange
        let mut document = started();
        document.apply_move(&participant("alice"), 0, &clock()).unwrap();

        // Act
        let effect = document.leave(&participant("alice")).unwrap();

        // Assert
        assert_eq!(effect, LeaveEffect::Update);
        assert_eq!(document.players.player1_id, participant("bob"));
        assert_eq!(document.players.player2_id, None);
        assert_eq!(document.status, MatchStatus::Waiting);
        assert_eq!(document.winner, Winner::None);
        assert_eq!(document.board.get(0), Some(Mark::X));
        assert_eq!(document.role_of(&participant("bob")), Some(Mark::X));
    }

    #[test]
    fn test_player_two_leaving_clears_seat_and_winner() {
        // Arrange
        let mut document = started();
        document.winner = Winner::O;
        document.status = MatchStatus::Finished;

        // Act
        let effect = document.leave(&participant("bob")).unwrap();

        // Assert
        assert_eq!(effect, LeaveEffect::Update);
        assert_eq!(document.players.player2_id, None);
        assert_eq!(document.status, MatchStatus::Waiting);
        assert_eq!(document.winner, Winner::None);
    }

    #[test]
    fn test_stranger_cannot_leave() {
        let mut document = started();

        let result = document.leave(&participant("carol"));

        assert!(matches!(result, Err(DomainError::NotAParticipant(_))));
    }

    #[test]
    fn test_reset_clears_board_even_with_one_player() {
        // Arrange
        let mut document = started();
        document.apply_move(&participant("alice"), 0, &clock()).unwrap();
        document.leave(&participant("bob")).unwrap();

        // Act
        document.reset(&participant("alice"), &clock()).unwrap();

        // Assert
        assert_eq!(document.board, Board::new());
        assert_eq!(document.current_player, Mark::X);
        assert_eq!(document.winner, Winner::None);
        assert_eq!(document.status, MatchStatus::InProgress);
    }

    #[test]
    fn test_reset_by_stranger_is_rejected() {
        let mut document = started();

        let result = document.reset(&participant("carol"), &clock());

        assert!(matches!(result, Err(DomainError::NotAParticipant(_))));
    }

    #[test]
    fn test_participant_state_follows_status_and_role() {
        let alice = participant("alice");
        let carol = participant("carol");
        let lobby = MatchDocument::new(alice.clone(), &clock());

        assert_eq!(ParticipantState::derive(None, &alice), ParticipantState::NoMatch);
        assert_eq!(
            ParticipantState::derive(Some(&lobby), &alice),
            ParticipantState::LobbyWaiting
        );
        assert_eq!(
            ParticipantState::derive(Some(&lobby), &carol),
            ParticipantState::NoMatch
        );
        assert_eq!(
            ParticipantState::derive(Some(&started()), &alice),
            ParticipantState::InProgress
        );
    }
}
