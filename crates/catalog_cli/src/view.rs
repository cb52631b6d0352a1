//! Console view for the catalog menu.
//!
//! # Responsibility
//! - Render menus, product tables and status messages.
//! - Read raw text answers; all validation stays in the service.

use catalog_core::Product;
use std::io::{self, BufRead, Write};

const RULE_WIDTH: usize = 80;

/// Severity of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Error,
}

/// Raw answers for one product form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub category: String,
    pub stock: String,
}

/// Text console over any reader/writer pair.
pub struct ConsoleView<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleView<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn show_menu(&mut self) -> io::Result<()> {
        let rule = "=".repeat(50);
        writeln!(self.output)?;
        writeln!(self.output, "{rule}")?;
        writeln!(self.output, "    PRODUCT CATALOG")?;
        writeln!(self.output, "{rule}")?;
        writeln!(self.output, "1. List products")?;
        writeln!(self.output, "2. Add product")?;
        writeln!(self.output, "3. Edit product")?;
        writeln!(self.output, "4. Delete product")?;
        writeln!(self.output, "5. Show product by id")?;
        writeln!(self.output, "6. Exit")?;
        writeln!(self.output, "{rule}")
    }

    pub fn show_products(&mut self, products: &[Product]) -> io::Result<()> {
        if products.is_empty() {
            return writeln!(self.output, "\nNo products registered.");
        }

        let rule = "-".repeat(RULE_WIDTH);
        writeln!(self.output, "\n{rule}")?;
        writeln!(
            self.output,
            "{:<5} {:<25} {:<12} {:<20} {:<10}",
            "ID", "Name", "Price", "Category", "Stock"
        )?;
        writeln!(self.output, "{rule}")?;
        for product in products {
            writeln!(
                self.output,
                "{:<5} {:<25} {:<12} {:<20} {:<10}",
                product.id,
                product.name,
                format!("${:.2}", product.price),
                product.category,
                product.stock
            )?;
        }
        writeln!(self.output, "{rule}")?;
        writeln!(self.output, "Total products: {}", products.len())
    }

    pub fn show_product(&mut self, product: Option<&Product>) -> io::Result<()> {
        let Some(product) = product else {
            return writeln!(self.output, "\nProduct not found.");
        };

        let rule = "-".repeat(50);
        writeln!(self.output, "\n{rule}")?;
        writeln!(self.output, "PRODUCT DETAILS")?;
        writeln!(self.output, "{rule}")?;
        writeln!(self.output, "ID:        {}", product.id)?;
        writeln!(self.output, "Name:      {}", product.name)?;
        writeln!(self.output, "Price:     ${:.2}", product.price)?;
        writeln!(self.output, "Category:  {}", product.category)?;
        writeln!(self.output, "Stock:     {}", product.stock)?;
        writeln!(self.output, "{rule}")
    }

    pub fn show_message(&mut self, message: &str, kind: MessageKind) -> io::Result<()> {
        match kind {
            MessageKind::Error => writeln!(self.output, "\nError: {message}"),
            MessageKind::Success => writeln!(self.output, "\nOK: {message}"),
            MessageKind::Info => writeln!(self.output, "\n{message}"),
        }
    }

    /// Prints `label` and returns the trimmed answer. `None` on end of input.
    pub fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Like [`Self::prompt`], keeping `current` when the answer is blank.
    pub fn prompt_with_default(
        &mut self,
        label: &str,
        current: &str,
    ) -> io::Result<Option<String>> {
        Ok(self
            .prompt(&format!("{label} [{current}]: "))?
            .map(|answer| {
                if answer.is_empty() {
                    current.to_string()
                } else {
                    answer
                }
            }))
    }

    pub fn ask_product_form(&mut self) -> io::Result<Option<ProductForm>> {
        let Some(name) = self.prompt("Product name: ")? else {
            return Ok(None);
        };
        let Some(price) = self.prompt("Price: ")? else {
            return Ok(None);
        };
        let Some(category) = self.prompt("Category: ")? else {
            return Ok(None);
        };
        let Some(stock) = self.prompt("Stock: ")? else {
            return Ok(None);
        };
        Ok(Some(ProductForm {
            name,
            price,
            category,
            stock,
        }))
    }

    /// Asks for new values, pre-filled from `current`.
    pub fn ask_product_changes(&mut self, current: &Product) -> io::Result<Option<ProductForm>> {
        writeln!(
            self.output,
            "\nEnter the new values (leave blank to keep the current one):"
        )?;
        let Some(name) = self.prompt_with_default("New name", &current.name)? else {
            return Ok(None);
        };
        let Some(price) = self.prompt_with_default("New price", &current.price.to_string())? else {
            return Ok(None);
        };
        let Some(category) = self.prompt_with_default("New category", &current.category)? else {
            return Ok(None);
        };
        let Some(stock) = self.prompt_with_default("New stock", &current.stock.to_string())?
        else {
            return Ok(None);
        };
        Ok(Some(ProductForm {
            name,
            price,
            category,
            stock,
        }))
    }

    /// Accepts `s`/`y` (any case) as yes.
    pub fn confirm(&mut self, label: &str) -> io::Result<bool> {
        let answer = self.prompt(label)?.unwrap_or_default().to_lowercase();
        Ok(answer == "s" || answer == "y")
    }

    pub fn pause(&mut self) -> io::Result<()> {
        self.prompt("\nPress Enter to continue...").map(|_| ())
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
