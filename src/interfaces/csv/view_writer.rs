use crate::domain::contract::ContractView;
use crate::error::Result;
use std::io::Write;

/// Writes contract views as CSV to any `Write` sink.
pub struct ViewWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ViewWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_views(&mut self, mut views: Vec<ContractView>) -> Result<()> {
        // Deterministic output regardless of processing order.
        views.sort_by(|a, b| a.account_id.cmp(&b.account_id));
        for view in views {
            self.writer.serialize(view)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_writes_sorted_views_with_header() {
        let views = vec![
            ContractView {
                account_id: "acc-2".to_string(),
                limit_amount: dec!(500.00),
                outstanding_debt: dec!(120.00),
                available_limit: dec!(380.00),
            },
            ContractView {
                account_id: "acc-1".to_string(),
                limit_amount: dec!(1000.00),
                outstanding_debt: dec!(0),
                available_limit: dec!(1000.00),
            },
        ];

        let mut buffer = Vec::new();
        let mut writer = ViewWriter::new(&mut buffer);
        writer.write_views(views).unwrap();
        drop(writer);

        let output = String::from_utf8(buffer).unwrap();
        let mut lines = output.lines();
        assert_eq!(
            lines.next().unwrap(),
            "account_id,limit_amount,outstanding_debt,available_limit"
        );
        assert_eq!(lines.next().unwrap(), "acc-1,1000.00,0,1000.00");
        assert_eq!(lines.next().unwrap(), "acc-2,500.00,120.00,380.00");
    }
}
