//! Batch command - replays a JSON-lines file of operations
//!
//! Every input line is one operation run against a fresh in-memory
//! registry. Every line produces one JSON result line on stdout, so the
//! output can be zipped back onto the input by line number.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::domain::pix_key::{AccountDetails, KeyType, NewPixKey, PixKey, PixKeyId};
use crate::domain::DomainError;
use crate::infrastructure::pix_key::{
    AlterPixKeyRequest, InMemoryPixKeyRepository, PixKeyLookup, PixKeyServices,
};

/// Code reported for lines that cannot be parsed into an operation
pub const PARSE_ERROR_CODE: &str = "400.000";

/// Arguments for the batch command
#[derive(Args, Clone)]
pub struct BatchArgs {
    /// Input file with one JSON operation per line, or `-` for stdin
    pub input: PathBuf,

    /// Stop at the first failing line and exit non-zero
    #[arg(long)]
    pub strict: bool,
}

/// One line of batch input
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BatchOperation {
    Register(NewPixKey),
    Alter(AlterLine),
    Deactivate {
        id: String,
    },
    Query(QueryCriteria),
}

/// Body of an `alter` line
#[derive(Debug, Clone, Deserialize)]
pub struct AlterLine {
    pub id: String,
    #[serde(default)]
    pub expected_key_type: Option<KeyType>,
    #[serde(flatten)]
    pub account: AccountDetails,
}

/// Lookup criterion of a `query` line, selected by its `by` field
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum QueryCriteria {
    Id { id: String },
    Account { branch_number: u32, account_number: u32 },
    OwnerName { name: String },
}

impl QueryCriteria {
    fn into_lookup(self) -> Result<PixKeyLookup, DomainError> {
        Ok(match self {
            Self::Id { id } => PixKeyLookup::ById(PixKeyId::parse(&id)?),
            Self::Account {
                branch_number,
                account_number,
            } => PixKeyLookup::ByAccount {
                branch_number,
                account_number,
            },
            Self::OwnerName { name } => PixKeyLookup::ByOwnerName(name),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Ok,
    Error,
}

/// One line of batch output
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub line: usize,
    pub status: BatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<PixKey>>,
}

impl BatchResult {
    fn ok(line: usize, records: Vec<PixKey>) -> Self {
        Self {
            line,
            status: BatchStatus::Ok,
            code: None,
            message: None,
            records: Some(records),
        }
    }

    fn error(line: usize, code: &str, message: String) -> Self {
        Self {
            line,
            status: BatchStatus::Error,
            code: Some(code.to_string()),
            message: Some(message),
            records: None,
        }
    }

    fn from_domain(line: usize, error: &DomainError) -> Self {
        Self::error(line, error.code(), error.to_string())
    }

    pub fn is_ok(&self) -> bool {
        self.status == BatchStatus::Ok
    }
}

/// Run the batch command
pub async fn run(args: BatchArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = if args.input.as_os_str() == "-" {
        Box::new(BufReader::new(tokio::io::stdin()))
    } else {
        let file = tokio::fs::File::open(&args.input)
            .await
            .with_context(|| format!("Failed to open {}", args.input.display()))?;
        Box::new(BufReader::new(file))
    };

    let services = PixKeyServices::new(
        Arc::new(InMemoryPixKeyRepository::new()),
        &config.registry,
    );

    info!(input = %args.input.display(), strict = args.strict, "Starting batch");

    let mut lines = reader.lines();
    let mut line_number = 0;
    let mut succeeded = 0;
    let mut failed = 0;

    while let Some(raw) = lines.next_line().await.context("Failed to read input")? {
        line_number += 1;

        if raw.trim().is_empty() {
            continue;
        }

        let result = process_line(&services, line_number, &raw).await;
        println!("{}", serde_json::to_string(&result)?);

        if result.is_ok() {
            succeeded += 1;
        } else {
            failed += 1;
            if args.strict {
                anyhow::bail!("Batch stopped at line {}", line_number);
            }
        }
    }

    info!(lines = line_number, succeeded, failed, "Batch finished");
    Ok(())
}

/// Parse and execute one input line
pub async fn process_line(
    services: &PixKeyServices<InMemoryPixKeyRepository>,
    line: usize,
    raw: &str,
) -> BatchResult {
    let operation: BatchOperation = match serde_json::from_str(raw) {
        Ok(op) => op,
        Err(e) => {
            warn!(line, error = %e, "Unparseable batch line");
            return BatchResult::error(line, PARSE_ERROR_CODE, format!("Invalid operation: {}", e));
        }
    };

    match execute(services, operation).await {
        Ok(records) => BatchResult::ok(line, records),
        Err(e) => {
            warn!(line, code = e.code(), error = %e, "Batch operation failed");
            BatchResult::from_domain(line, &e)
        }
    }
}

async fn execute(
    services: &PixKeyServices<InMemoryPixKeyRepository>,
    operation: BatchOperation,
) -> Result<Vec<PixKey>, DomainError> {
    match operation {
        BatchOperation::Register(new_key) => {
            services.registration.register(new_key).await.map(|k| vec![k])
        }
        BatchOperation::Alter(line) => {
            let id = PixKeyId::parse(&line.id)?;
            let mut request = AlterPixKeyRequest::new(line.account);
            if let Some(key_type) = line.expected_key_type {
                request = request.with_expected_key_type(key_type);
            }
            services.alteration.alter(&id, request).await.map(|k| vec![k])
        }
        BatchOperation::Deactivate { id } => {
            let id = PixKeyId::parse(&id)?;
            services.alteration.deactivate(&id).await.map(|k| vec![k])
        }
        BatchOperation::Query(criteria) => {
            let lookup = criteria.into_lookup()?;
            services.query.lookup(&lookup).await
        }
    }
}
