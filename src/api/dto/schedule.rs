//! Schedule description DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::schedule::Locale;

/// Query for `GET /api/schedules/describe`.
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct DescribeQuery {
    /// Five-field cron expression
    #[validate(length(max = 256, message = "Expression is too long"))]
    #[param(example = "0 9 * * 1-5")]
    pub expression: String,
    /// Language tag such as `en` or `zh_CN`; English when absent
    #[validate(length(max = 35))]
    pub locale: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "expression": "0 9 * * 1-5",
    "locale": "en",
    "description": "At 09:00, on Monday through Friday",
    "valid": true
}))]
pub struct DescribeResponse {
    pub expression: String,
    pub locale: Locale,
    /// The sentence, or the localized "invalid expression" text
    pub description: String,
    pub valid: bool,
}

/// Query for `GET /api/tasks`.
#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct TaskListQuery {
    /// Language for schedule descriptions
    #[validate(length(max = 35))]
    pub locale: Option<String>,
}

pub(crate) fn locale_of(tag: Option<&str>) -> Locale {
    tag.map(Locale::from_tag).unwrap_or_default()
}
