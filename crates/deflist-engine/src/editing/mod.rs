/*!
 * # Live Editing
 *
 * Keeps definition-list decorations correct while a document is edited
 * character by character in an editing surface.
 *
 * ## Architecture Overview
 *
 * ### 1. One engine per document
 * - A [`LiveEngine`] owns the `xi_rope::Rope`, the oracle and the derived
 *   blocks and decorations of exactly one open document
 * - There is no process-wide state; two documents never share an engine
 *
 * ### 2. Edits arrive as deltas
 * - Every edit is one coalesced `xi_rope::Delta`, applied in submission order
 * - Decorations are remapped through the delta before anything else looks at
 *   them, so local patches compose with the remap
 *
 * ### 3. Two-tier update
 * - [`plan_update`] inspects each changed range and returns
 *   [`UpdateOutcome::NoOp`], a [`LocalPatch`] or a
 *   [`UpdateOutcome::FullRescan`] with its [`RescanReason`]
 * - A full rescan covers only the visible lines, so its cost is bounded by
 *   the viewport and not by the document
 *
 * ## Module Structure
 *
 * - **`decorations`**: [`Style`], [`Decoration`] and the sorted [`DecorationSet`]
 * - **`update`**: the planner and its outcome types
 * - **`engine`**: [`LiveEngine`] and [`UpdateReport`]
 */

pub mod decorations;
pub mod engine;
pub mod update;

pub use decorations::{Decoration, DecorationSet, Style, decorations_for_line};
pub use engine::{Applied, LiveEngine, UpdateReport};
pub use update::{LinePatch, LocalPatch, RescanReason, UpdateInput, UpdateOutcome, plan_update};
