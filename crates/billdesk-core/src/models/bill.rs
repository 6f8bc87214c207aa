use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: i64,
    #[serde(default)]
    pub inv_no: String,
    #[serde(default)]
    pub amount_unpaid: f64,
}

/// A company together with its unpaid bills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyBills {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bills: Vec<Bill>,
}

impl CompanyBills {
    pub fn amount_unpaid(&self) -> f64 {
        self.bills.iter().map(|b| b.amount_unpaid).sum()
    }
}

/// Response of the grouped unpaid-bills endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpaidBills {
    #[serde(default, alias = "companies_with_unpaid_bills")]
    pub companies: Vec<CompanyBills>,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub total_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpaid_bills_deserialize() {
        let json = r#"{
            "companies": [
                {"id": 1, "name": "Demo Company", "bills": [
                    {"id": 1, "inv_no": "INV-001", "amount_unpaid": 5000},
                    {"id": 2, "inv_no": "INV-002", "amount_unpaid": 3000}
                ]}
            ],
            "totalAmount": 8000,
            "totalCount": 2
        }"#;
        let unpaid: UnpaidBills = serde_json::from_str(json).unwrap();
        assert_eq!(unpaid.total_count, 2);
        assert_eq!(unpaid.companies.len(), 1);
        assert_eq!(unpaid.companies[0].bills[1].inv_no, "INV-002");
        assert_eq!(unpaid.companies[0].amount_unpaid(), 8000.0);
    }

    #[test]
    fn test_unpaid_bills_legacy_key() {
        let json = r#"{"companies_with_unpaid_bills": [{"id": 9, "name": "Acme"}]}"#;
        let unpaid: UnpaidBills = serde_json::from_str(json).unwrap();
        assert_eq!(unpaid.companies[0].name, "Acme");
        assert!(unpaid.companies[0].bills.is_empty());
    }

    #[test]
    fn test_unpaid_bills_empty_object() {
        let unpaid: UnpaidBills = serde_json::from_str("{}").unwrap();
        assert!(unpaid.companies.is_empty());
        assert_eq!(unpaid.total_amount, 0.0);
    }
}
