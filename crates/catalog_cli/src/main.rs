//! Console entry point for the product catalog.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the catalog context.
//! - Dispatch menu options to the product service and render results.

mod view;

use catalog_core::{
    init_logging_from_config, CatalogConfig, CatalogContext, CatalogProductService,
    ProductActionResponse,
};
use log::{error, warn};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use view::{ConsoleView, MessageKind};

fn main() -> ExitCode {
    let config = CatalogConfig::from_env();
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    let context = match CatalogContext::init(config) {
        Ok(context) => context,
        Err(err) => {
            error!("event=cli_start module=cli status=error error_code=db_init_failed error={err}");
            eprintln!("could not open the catalog database: {err}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = context
        .product_service()
        .map_err(|err| err.to_string())
        .and_then(|service| {
            let stdin = io::stdin();
            let mut console = ConsoleView::new(stdin.lock(), io::stdout());
            run(&service, &mut console).map_err(|err| err.to_string())
        });

    if let Err(err) = context.shutdown() {
        warn!("event=cli_exit module=cli status=error error_code=db_close_failed error={err}");
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("catalog stopped: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run<R: BufRead, W: Write>(
    service: &CatalogProductService<'_>,
    console: &mut ConsoleView<R, W>,
) -> io::Result<()> {
    console.show_message("Welcome to the product catalog", MessageKind::Info)?;

    loop {
        console.show_menu()?;
        let Some(option) = console.prompt("\nSelect an option: ")? else {
            return Ok(());
        };

        match option.as_str() {
            "1" => list_products(service, console)?,
            "2" => add_product(service, console)?,
            "3" => edit_product(service, console)?,
            "4" => delete_product(service, console)?,
            "5" => show_product(service, console)?,
            "6" => {
                console.show_message("Goodbye!", MessageKind::Info)?;
                return Ok(());
            }
            _ => console.show_message(
                "Invalid option. Please choose a number from 1 to 6.",
                MessageKind::Error,
            )?,
        }
        console.pause()?;
    }
}

fn list_products<R: BufRead, W: Write>(
    service: &CatalogProductService<'_>,
    console: &mut ConsoleView<R, W>,
) -> io::Result<()> {
    match service.list() {
        Ok(products) => console.show_products(&products),
        Err(err) => console.show_message(
            &format!("could not list products: {err}"),
            MessageKind::Error,
        ),
    }
}

fn add_product<R: BufRead, W: Write>(
    service: &CatalogProductService<'_>,
    console: &mut ConsoleView<R, W>,
) -> io::Result<()> {
    console.show_message("--- ADD PRODUCT ---", MessageKind::Info)?;
    let Some(form) = console.ask_product_form()? else {
        return Ok(());
    };
    let response = service.create(&form.name, &form.price, &form.category, &form.stock);
    report(console, &response)
}

fn edit_product<R: BufRead, W: Write>(
    service: &CatalogProductService<'_>,
    console: &mut ConsoleView<R, W>,
) -> io::Result<()> {
    console.show_message("--- EDIT PRODUCT ---", MessageKind::Info)?;
    let Some(raw_id) = console.prompt("Product id: ")? else {
        return Ok(());
    };
    let Some(current) = lookup(service, console, &raw_id)? else {
        return Ok(());
    };

    console.show_product(Some(&current))?;
    let Some(form) = console.ask_product_changes(&current)? else {
        return Ok(());
    };
    let response = service.edit(&raw_id, &form.name, &form.price, &form.category, &form.stock);
    report(console, &response)
}

fn delete_product<R: BufRead, W: Write>(
    service: &CatalogProductService<'_>,
    console: &mut ConsoleView<R, W>,
) -> io::Result<()> {
    console.show_message("--- DELETE PRODUCT ---", MessageKind::Info)?;
    let Some(raw_id) = console.prompt("Product id: ")? else {
        return Ok(());
    };
    let Some(current) = lookup(service, console, &raw_id)? else {
        return Ok(());
    };

    console.show_product(Some(&current))?;
    if !console.confirm("\nDelete this product? (y/n): ")? {
        return console.show_message("Operation cancelled", MessageKind::Info);
    }
    let response = service.delete(&raw_id);
    report(console, &response)
}

fn show_product<R: BufRead, W: Write>(
    service: &CatalogProductService<'_>,
    console: &mut ConsoleView<R, W>,
) -> io::Result<()> {
    console.show_message("--- SHOW PRODUCT ---", MessageKind::Info)?;
    let Some(raw_id) = console.prompt("Product id: ")? else {
        return Ok(());
    };
    match service.get(&raw_id) {
        Ok(product) => console.show_product(product.as_ref()),
        Err(err) => console.show_message(
            &format!("could not load product: {err}"),
            MessageKind::Error,
        ),
    }
}

/// Loads a product for edit/delete, printing the miss or read error.
fn lookup<R: BufRead, W: Write>(
    service: &CatalogProductService<'_>,
    console: &mut ConsoleView<R, W>,
    raw_id: &str,
) -> io::Result<Option<catalog_core::Product>> {
    match service.get(raw_id) {
        Ok(Some(product)) => Ok(Some(product)),
        Ok(None) => {
            console.show_message(
                &format!("no product with id {}", raw_id.trim()),
                MessageKind::Error,
            )?;
            Ok(None)
        }
        Err(err) => {
            console.show_message(&format!("could not load product: {err}"), MessageKind::Error)?;
            Ok(None)
        }
    }
}

fn report<R: BufRead, W: Write>(
    console: &mut ConsoleView<R, W>,
    response: &ProductActionResponse,
) -> io::Result<()> {
    let kind = if response.ok {
        MessageKind::Success
    } else {
        MessageKind::Error
    };
    console.show_message(&response.message, kind)
}
