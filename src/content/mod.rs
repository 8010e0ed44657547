/*!
 * Content Module
 * Storage-independent rules for site content: fallbacks, ordering,
 * validation, access decisions and exports.
 */
pub mod access;
pub mod benefits;
pub mod defaults;
pub mod export;
pub mod forms;
pub mod ordering;
pub mod page;
pub mod validation;
