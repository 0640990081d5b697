//! # Advanced Results
//!
//! Runs a [`QueryPlan`] against a [`Collection`] and wraps the page in the
//! standard `{success, count, pagination, data}` envelope shared by every
//! list endpoint.
//!
//! The total is counted first and the page fetched second. The two reads
//! are not linked, so under concurrent writes `total` may disagree with
//! the fetched page by the number of records written in between.

use serde::Serialize;
use serde_json::Value;

use super::collection::{Collection, Expansion, FindQuery};
use super::errors::RestResult;
use super::parser::QueryPlan;

/// Reference to a neighbouring page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub page: u64,
    pub limit: u64,
}

/// Page boundaries and neighbour links.
///
/// Only `next` and `prev` are part of the response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationWindow {
    #[serde(skip)]
    pub start_index: u64,

    #[serde(skip)]
    pub end_index: u64,

    #[serde(skip)]
    pub total: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

impl PaginationWindow {
    /// Compute the window for `page`/`limit` over `total` matching records.
    ///
    /// `next` is present iff `end_index < total`; `prev` iff `start_index > 0`.
    pub fn compute(page: u64, limit: u64, total: u64) -> Self {
        let start_index = page.saturating_sub(1).saturating_mul(limit);
        let end_index = page.saturating_mul(limit);

        let next = (end_index < total).then(|| PageRef {
            page: page + 1,
            limit,
        });
        let prev = (start_index > 0).then(|| PageRef {
            page: page - 1,
            limit,
        });

        Self {
            start_index,
            end_index,
            total,
            next,
            prev,
        }
    }
}

/// Standard list response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEnvelope {
    pub success: bool,

    /// Records on this page
    pub count: usize,

    pub pagination: PaginationWindow,

    pub data: Vec<Value>,
}

/// Executes query plans against collections
pub struct ResultAssembler;

impl ResultAssembler {
    /// Count, fetch one page and build the envelope.
    ///
    /// Any collection failure aborts the whole call; no partial envelope is
    /// ever returned.
    pub fn assemble(
        collection: &dyn Collection,
        plan: &QueryPlan,
        expand: Option<&[Expansion]>,
    ) -> RestResult<ResultEnvelope> {
        let total = collection.count(&plan.filter)?;
        let pagination = PaginationWindow::compute(plan.page, plan.limit, total);

        let data = collection.find(&FindQuery {
            filter: &plan.filter,
            sort: &plan.sort,
            projection: plan.projection.as_ref(),
            expand: expand.unwrap_or(&[]),
            skip: pagination.start_index,
            limit: plan.limit,
        })?;

        Ok(ResultEnvelope {
            success: true,
            count: data.len(),
            pagination,
            data,
        })
    }
}
