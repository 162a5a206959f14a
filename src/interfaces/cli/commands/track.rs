//! Track command
//!
//! 在命令行里构造一次页面环境，生成事件并交给配置的采集器。

use std::sync::Arc;

use colored::Colorize;

use crate::cli::{PageArgs, TrackCommands};
use crate::config::{CollectorKind, StaticConfig};
use crate::interfaces::cli::CliError;
use crate::tracking::session::{SESSION_ID_KEY, USER_ID_KEY};
use crate::tracking::{
    CalculatorUsage, ConversionEvent, CtaClick, EventLogger, MemoryStore, PageEnvironment,
    PageView, WhatsAppClick, build_collector,
};

pub fn run_track(
    config: &StaticConfig,
    page: PageArgs,
    event: TrackCommands,
) -> Result<(), CliError> {
    let handle = build_collector(&config.collector)?;

    let mut session_store = MemoryStore::new();
    if let Some(id) = page.session_id.as_deref() {
        session_store = session_store.with_entry(SESSION_ID_KEY, id);
    }
    let mut user_store = MemoryStore::new();
    if let Some(id) = page.user_id.as_deref() {
        user_store = user_store.with_entry(USER_ID_KEY, id);
    }

    let mut env = PageEnvironment::new()
        .with_document(
            page.page_title.as_deref().unwrap_or_default(),
            page.referrer.as_deref().unwrap_or_default(),
        )
        .with_session_store(Arc::new(session_store))
        .with_user_store(Arc::new(user_store))
        .with_collector(handle.collector());
    if let Some(url) = page.page_url.as_deref() {
        env = env.with_location(url);
    }

    let logger = EventLogger::with_config(Arc::new(env), config.tracking.clone());
    let record = emit(&logger, &event);
    // 释放采集器副本，worker 才能退出
    drop(logger);
    handle.shutdown();

    if config.collector.kind != CollectorKind::Stdout {
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| CliError::CommandError(e.to_string()))?;
        println!("{}", json);
    }
    eprintln!(
        "{} Forwarded {} via {} (session {})",
        "✓".bold().green(),
        record.event_type().unwrap_or_default().cyan(),
        config.collector.kind.as_ref().magenta(),
        record.session_id().unwrap_or("-").dimmed()
    );
    Ok(())
}

fn emit(logger: &EventLogger, event: &TrackCommands) -> ConversionEvent {
    match event {
        TrackCommands::Cta {
            cta_type,
            location,
            target_url,
            program,
            content_type,
        } => logger.log_cta_click(CtaClick {
            cta_type,
            cta_location: location,
            target_url,
            program: program.as_deref(),
            content_type: content_type.as_deref(),
        }),

        TrackCommands::Whatsapp {
            phone,
            message,
            location,
            program,
            content_type,
        } => logger.log_whatsapp_click(WhatsAppClick {
            phone_number: phone,
            message,
            context: location,
            program: program.as_deref(),
            content_type: content_type.as_deref(),
        }),

        TrackCommands::PageView {
            content_type,
            program,
            category,
        } => logger.log_page_view(PageView {
            content_type: content_type.as_deref(),
            program: program.as_deref(),
            category: category.as_deref(),
        }),

        TrackCommands::Calculator {
            program,
            gpa,
            country,
            base_fee,
            scholarship,
            final_amount,
            action,
        } => logger.log_calculator_usage(CalculatorUsage {
            program,
            gpa: *gpa,
            country,
            base_fee: *base_fee,
            scholarship_percentage: *scholarship,
            final_amount: *final_amount,
            action: action.as_deref(),
        }),
    }
}
