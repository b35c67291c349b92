//! Render quote lists as HTML markup or console text

use crate::defaults;
use crate::error::RenderError;
use crate::quote::Quote;
use std::io::Write;

/// `symbol` followed by the amount to two decimals; non-finite amounts render as `-`
pub fn format_currency(amount: f64, currency_symbol: &str) -> String {
    if !amount.is_finite() {
        return "-".to_string();
    }
    format!("{}{:.2}", currency_symbol, amount)
}

/// Display data for one quote: a label plus an action control
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQuote {
    /// `"{carrier} - {premium}/{modality}"`
    pub label: String,
    pub carrier: String,
    pub product: String,
    pub href: String,
    pub button_text: String,
}

impl RenderedQuote {
    pub fn from_quote(quote: &Quote, currency_symbol: &str) -> Self {
        let non_empty = |value: &str, fallback: &str| {
            if value.is_empty() { fallback.to_string() } else { value.to_string() }
        };
        Self {
            label: format!(
                "{} - {}/{}",
                quote.carrier,
                format_currency(quote.premium, currency_symbol),
                quote.modality
            ),
            carrier: quote.carrier.clone(),
            product: quote.product.clone(),
            href: non_empty(&quote.link_url, defaults::LINK_URL),
            button_text: non_empty(&quote.button_text, defaults::BUTTON_TEXT),
        }
    }
}

/// Surface a quote list is drawn onto
pub trait RenderTarget {
    /// Discard anything previously rendered
    fn clear(&mut self) -> Result<(), RenderError>;

    fn begin_list(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn append(&mut self, item: &RenderedQuote) -> Result<(), RenderError>;

    fn end_list(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Options for `render_quote_list`
#[derive(Default)]
pub struct RenderOptions<'a> {
    /// Overrides the symbol carried by the first quote
    pub currency_symbol: Option<String>,
    /// Invoked with the quote whose action control is activated
    pub on_action: Option<Box<dyn Fn(&Quote) + 'a>>,
}

/// Rendered list whose action controls can be activated by position
pub struct QuoteList<'q, 'a> {
    quotes: &'q [Quote],
    items: Vec<RenderedQuote>,
    on_action: Option<Box<dyn Fn(&Quote) + 'a>>,
}

impl<'q, 'a> QuoteList<'q, 'a> {
    pub fn items(&self) -> &[RenderedQuote] {
        &self.items
    }

    /// Activate the action control of the item at `index`
    pub fn activate(&self, index: usize) -> Option<&'q Quote> {
        let quote = self.quotes.get(index)?;
        if let Some(callback) = &self.on_action {
            callback(quote);
        }
        Some(quote)
    }
}

/// Render every quote onto `target`, replacing its previous content
pub fn render_quote_list<'q, 'a, T>(
    quotes: &'q [Quote],
    target: Option<&mut T>,
    options: RenderOptions<'a>,
) -> Result<QuoteList<'q, 'a>, RenderError>
where
    T: RenderTarget + ?Sized,
{
    let target = target.ok_or(RenderError::MissingTarget)?;
    let currency_symbol = options
        .currency_symbol
        .or_else(|| quotes.first().map(|q| q.currency_symbol.clone()))
        .unwrap_or_else(|| defaults::CURRENCY_SYMBOL.to_string());

    target.clear()?;
    target.begin_list()?;
    let mut items = Vec::with_capacity(quotes.len());
    for quote in quotes {
        let item = RenderedQuote::from_quote(quote, &currency_symbol);
        target.append(&item)?;
        items.push(item);
    }
    target.end_list()?;

    Ok(QuoteList {
        quotes,
        items,
        on_action: options.on_action,
    })
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// HTML markup target for embedding a quote list in a page
#[derive(Debug, Default)]
pub struct HtmlTarget {
    html: String,
}

impl HtmlTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

impl RenderTarget for HtmlTarget {
    fn clear(&mut self) -> Result<(), RenderError> {
        self.html.clear();
        Ok(())
    }

    fn begin_list(&mut self) -> Result<(), RenderError> {
        self.html.push_str("<div class=\"quote-tool__list\">");
        Ok(())
    }

    fn append(&mut self, item: &RenderedQuote) -> Result<(), RenderError> {
        self.html.push_str(&format!(
            "<div class=\"quote-tool__item\"><div class=\"quote-tool__label\">{}</div>\
             <a class=\"quote-tool__cta\" href=\"{}\" data-carrier=\"{}\" data-product=\"{}\" role=\"button\">{}</a></div>",
            escape_html(&item.label),
            escape_html(&item.href),
            escape_html(&item.carrier),
            escape_html(&item.product),
            escape_html(&item.button_text),
        ));
        Ok(())
    }

    fn end_list(&mut self) -> Result<(), RenderError> {
        self.html.push_str("</div>");
        Ok(())
    }
}

/// Console target: one line per quote followed by its link
pub struct TextTarget<W: Write> {
    writer: W,
}

impl<W: Write> TextTarget<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderTarget for TextTarget<W> {
    fn clear(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn begin_list(&mut self) -> Result<(), RenderError> {
        writeln!(self.writer, "Quotes:\n")?;
        Ok(())
    }

    fn append(&mut self, item: &RenderedQuote) -> Result<(), RenderError> {
        writeln!(self.writer, "{} ({}) - {}", item.label, item.product, item.button_text)?;
        writeln!(self.writer, "  Link: {}", item.href)?;
        Ok(())
    }
}
