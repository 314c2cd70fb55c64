use std::path::Path;

use legally_api::UploadFile;
use legally_core::entities::{Analysis, Contract};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ContractUploadArgs;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

#[derive(Serialize)]
struct UploadResponse {
    contract: Option<Contract>,
    analysis: Option<Analysis>,
}

pub async fn handle(
    args: &ContractUploadArgs,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let file = UploadFile::from_path(Path::new(&args.path)).await?;
    let mut library = ctx.contracts();

    let progress = Progress::bytes(file.size(), &file.filename);
    let result = library
        .upload_with_progress(&file, progress.observer())
        .await;
    let contract_id = match result {
        Ok(id) => {
            progress.finish_clear();
            id
        }
        Err(error) => {
            progress.finish_err("upload failed");
            ctx.notifications
                .error("Upload failed", Some(error.to_string()));
            return Err(error.into());
        }
    };
    ctx.notifications
        .success("Contract uploaded", Some(file.filename.clone()));

    let analysis = if args.analyze {
        let language = args
            .language
            .clone()
            .unwrap_or_else(|| ctx.config.general.output_language.clone());
        let mut session = ctx.analysis();
        let analysis = session.start(&contract_id, &language).await?;
        ctx.notifications.info("Analysis started", Some(analysis.id.clone()));
        Some(analysis)
    } else {
        None
    };

    output(
        &UploadResponse {
            contract: library.current().cloned(),
            analysis,
        },
        flags.format,
    )
}
