//! Client-side core of the Padh-AI study tracker.
//!
//! The backend owns every entity. This crate fetches read copies through the
//! [`StudyApi`] gateway, caches them for a bounded staleness window and derives
//! the calendar and dashboard values shown to the student.

pub mod analytics;
pub mod batch;
pub mod cache;
pub mod calendar;
pub mod client;
pub mod domain;

pub use analytics::{Dashboard, RevisionStats};
pub use batch::{Batch, QueryState};
pub use cache::{CachedStudyApi, QueryCache, QueryKey};
pub use calendar::{DayKey, ReferenceTime, RevisionIndex, RevisionStatus};
pub use client::{ApiError, HttpStudyApi, MemoryStudyApi, StudyApi};
