use std::collections::HashMap;

use pdf_table_xlsx::{ExtractOptions, PageSelection, XLSX_FILE_NAME, XLSX_MIME_TYPE};
use serde::Serialize;
use worker::{Context, Env, Request, Response, Result, RouteContext, Router};

use crate::error::ApiError;
use crate::pipeline;

pub async fn handle(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    Router::new()
        .post_async("/api/v1/pages", pages_route)
        .post_async("/api/v1/tables", tables_route)
        .post_async("/api/v1/xlsx", xlsx_route)
        .run(req, env)
        .await
}

async fn pages_route(mut req: Request, _ctx: RouteContext<()>) -> Result<Response> {
    let result = match read_pdf_body(&mut req).await {
        Ok(body) => pipeline::page_count(&body),
        Err(error) => Err(error),
    };
    match result {
        Ok(response) => json_response(&response),
        Err(error) => error.into_response(),
    }
}

async fn tables_route(mut req: Request, _ctx: RouteContext<()>) -> Result<Response> {
    match tables_response(&mut req).await {
        Ok(response) => json_response(&response),
        Err(error) => error.into_response(),
    }
}

async fn xlsx_route(mut req: Request, _ctx: RouteContext<()>) -> Result<Response> {
    match xlsx_response(&mut req).await {
        Ok(response) => Ok(response),
        Err(error) => error.into_response(),
    }
}

async fn tables_response(
    req: &mut Request,
) -> std::result::Result<crate::models::TablesResponse, ApiError> {
    let query = parse_query(req)?;
    let options = parse_extract_options(&query)?;
    let body = read_pdf_body(req).await?;
    pipeline::preview_tables(&body, &options)
}

async fn xlsx_response(req: &mut Request) -> std::result::Result<Response, ApiError> {
    let query = parse_query(req)?;
    let options = parse_extract_options(&query)?;
    let body = read_pdf_body(req).await?;
    let export = pipeline::build_xlsx(&body, &options)?;

    let mut response = Response::from_bytes(export.bytes)?;
    response.headers_mut().set("Content-Type", XLSX_MIME_TYPE)?;
    response.headers_mut().set(
        "Content-Disposition",
        &format!("attachment; filename=\"{XLSX_FILE_NAME}\""),
    )?;
    response.headers_mut().set(
        "X-Tables-Extracted",
        &export.summary.table_count.to_string(),
    )?;
    response.headers_mut().set("Cache-Control", "no-store")?;
    Ok(response)
}

async fn read_pdf_body(req: &mut Request) -> std::result::Result<Vec<u8>, ApiError> {
    let declared = req.headers().get("Content-Length")?;
    pipeline::check_content_length(declared.as_deref())?;
    Ok(req.bytes().await?)
}

fn json_response<T>(payload: &T) -> Result<Response>
where
    T: Serialize,
{
    let mut response = Response::from_json(payload)?;
    response.headers_mut().set("Cache-Control", "no-store")?;
    Ok(response)
}

fn parse_query(req: &Request) -> std::result::Result<HashMap<String, String>, ApiError> {
    let url = req.url()?;
    let query = url
        .query_pairs()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect::<HashMap<_, _>>();
    Ok(query)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn parse_threshold(
    query: &HashMap<String, String>,
    key: &str,
    default: usize,
) -> std::result::Result<usize, ApiError> {
    let Some(raw) = query.get(key) else {
        return Ok(default);
    };

    let parsed = raw.trim().parse::<usize>()?;
    if !(1..=1000).contains(&parsed) {
        return Err(ApiError::BadRequest(format!(
            "{key} must be within 1..=1000"
        )));
    }
    Ok(parsed)
}

/// Reads `pages`, `combine`, `min_rows` and `min_cols` from the query string.
pub fn parse_extract_options(
    query: &HashMap<String, String>,
) -> std::result::Result<ExtractOptions, ApiError> {
    let defaults = ExtractOptions::default();

    let pages = query
        .get("pages")
        .filter(|value| !value.trim().is_empty())
        .map(|value| value.parse::<PageSelection>())
        .transpose()
        .map_err(|error| ApiError::BadRequest(format!("invalid pages: {error}")))?;

    let combine = match query.get("combine") {
        None => defaults.combine,
        Some(value) => parse_flag(value).ok_or_else(|| {
            ApiError::BadRequest(format!("combine must be true or false, got '{value}'"))
        })?,
    };

    Ok(ExtractOptions {
        pages,
        min_rows: parse_threshold(query, "min_rows", defaults.min_rows)?,
        min_cols: parse_threshold(query, "min_cols", defaults.min_cols)?,
        combine,
    })
}
