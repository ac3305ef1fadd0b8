//! Scene state synchronization and history engine for a signage scene composer.
//!
//! A scene is an ordered list of rectangular blocks persisted as a
//! [`doc::SceneDocument`]. This crate keeps that document and a live visual
//! [`canvas::Canvas`] in lockstep while the user zooms, drags, re-orders,
//! adds and removes blocks, and steps through per-scene undo/redo history.
//! Drawing, hit-testing and persistence live outside the crate and are
//! reached through the traits in [`store`], [`blocks`] and [`bus`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | [`session::SceneEditor`]: scene lifecycle, rebuilds, history replay |
//! | [`router`] | Gesture handlers that write the document and raise notifications |
//! | [`service`] | Actor loop running an editor behind a command channel |
//! | [`pipeline`] | Sequential block construction and atomic canvas commit |
//! | [`zorder`] | Canvas stack / document order reconciliation |
//! | [`history`] | Bounded per-scene snapshot history |
//! | [`transform`] | Document/view coordinate conversion and zoom |
//! | [`canvas`] | Retained visual stack, viewport and selection |
//! | [`visual`] | Composite visual nodes and disposable block handles |
//! | [`doc`] | Scene documents and block records |
//! | [`bus`] | Commands, notifications, confirmation |
//! | [`store`] | Persistence trait and in-memory store |
//! | [`blocks`] | Block factory trait and placeholder factory |
//! | [`debounce`] | Trailing-edge debouncer |
//! | [`config`] | Environment configuration |
//! | [`consts`] | Shared defaults |

pub mod blocks;
pub mod bus;
pub mod canvas;
pub mod config;
pub mod consts;
pub mod debounce;
pub mod doc;
pub mod history;
pub mod pipeline;
pub mod router;
pub mod service;
pub mod session;
pub mod store;
pub mod transform;
pub mod visual;
pub mod zorder;

#[cfg(test)]
pub(crate) mod test_helpers;
