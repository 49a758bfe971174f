use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::Dataset;
use crate::domain::account::{Account, AccountId};
use crate::domain::deal::{Deal, DealId, DealStage};

struct SampleAccount {
    id: u32,
    contact_name: &'static str,
    contact_email: &'static str,
    company: &'static str,
    industry: &'static str,
    region: &'static str,
    created_date: (i32, u32, u32),
}

struct SampleDeal {
    id: u32,
    account_id: u32,
    name: &'static str,
    stage: DealStage,
    amount: i64,
    probability: u8,
    close_date: (i32, u32, u32),
    created_date: (i32, u32, u32),
    sales_rep: &'static str,
    product_category: &'static str,
}

/// Demo accounts shipped with the assistant.
const SAMPLE_ACCOUNTS: &[SampleAccount] = &[
    SampleAccount {
        id: 1,
        contact_name: "John Smith",
        contact_email: "john@acme.com",
        company: "Acme Corp",
        industry: "Technology",
        region: "North America",
        created_date: (2023, 1, 15),
    },
    SampleAccount {
        id: 2,
        contact_name: "Sarah Johnson",
        contact_email: "sarah@globex.com",
        company: "Globex Corporation",
        industry: "Manufacturing",
        region: "Europe",
        created_date: (2023, 2, 20),
    },
    SampleAccount {
        id: 3,
        contact_name: "Mike Chen",
        contact_email: "mike@techstart.com",
        company: "TechStart Inc",
        industry: "Technology",
        region: "Asia Pacific",
        created_date: (2023, 3, 10),
    },
    SampleAccount {
        id: 4,
        contact_name: "Emily Davis",
        contact_email: "emily@retailpro.com",
        company: "RetailPro Solutions",
        industry: "Retail",
        region: "North America",
        created_date: (2023, 4, 5),
    },
    SampleAccount {
        id: 5,
        contact_name: "David Wilson",
        contact_email: "david@fintech.com",
        company: "FinTech Innovations",
        industry: "Finance",
        region: "Europe",
        created_date: (2023, 5, 12),
    },
];

const SAMPLE_DEALS: &[SampleDeal] = &[
    SampleDeal {
        id: 1,
        account_id: 1,
        name: "Enterprise Software License",
        stage: DealStage::ClosedWon,
        amount: 250_000,
        probability: 100,
        close_date: (2024, 3, 15),
        created_date: (2024, 1, 10),
        sales_rep: "Alex Thompson",
        product_category: "Software",
    },
    SampleDeal {
        id: 2,
        account_id: 2,
        name: "Manufacturing Automation",
        stage: DealStage::Proposal,
        amount: 180_000,
        probability: 75,
        close_date: (2024, 4, 20),
        created_date: (2024, 2, 1),
        sales_rep: "Maria Garcia",
        product_category: "Hardware",
    },
    SampleDeal {
        id: 3,
        account_id: 3,
        name: "Cloud Migration Services",
        stage: DealStage::ClosedWon,
        amount: 95_000,
        probability: 100,
        close_date: (2024, 2, 28),
        created_date: (2024, 1, 5),
        sales_rep: "Alex Thompson",
        product_category: "Services",
    },
    SampleDeal {
        id: 4,
        account_id: 4,
        name: "POS System Upgrade",
        stage: DealStage::Negotiation,
        amount: 75_000,
        probability: 80,
        close_date: (2024, 5, 10),
        created_date: (2024, 3, 15),
        sales_rep: "Jennifer Lee",
        product_category: "Hardware",
    },
    SampleDeal {
        id: 5,
        account_id: 5,
        name: "Security Audit Package",
        stage: DealStage::ClosedWon,
        amount: 45_000,
        probability: 100,
        close_date: (2024, 1, 30),
        created_date: (2023, 12, 10),
        sales_rep: "Robert Kim",
        product_category: "Services",
    },
    SampleDeal {
        id: 6,
        account_id: 1,
        name: "Training & Support",
        stage: DealStage::Qualified,
        amount: 35_000,
        probability: 60,
        close_date: (2024, 6, 15),
        created_date: (2024, 4, 1),
        sales_rep: "Alex Thompson",
        product_category: "Services",
    },
    SampleDeal {
        id: 7,
        account_id: 3,
        name: "Mobile App Development",
        stage: DealStage::Proposal,
        amount: 120_000,
        probability: 70,
        close_date: (2024, 7, 20),
        created_date: (2024, 3, 20),
        sales_rep: "Maria Garcia",
        product_category: "Software",
    },
    SampleDeal {
        id: 8,
        account_id: 2,
        name: "Data Analytics Platform",
        stage: DealStage::Discovery,
        amount: 200_000,
        probability: 40,
        close_date: (2024, 8, 30),
        created_date: (2024, 4, 10),
        sales_rep: "Jennifer Lee",
        product_category: "Software",
    },
];

fn date((year, month, day): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

impl Dataset {
    /// The bundled demo dataset: five accounts and eight deals across the
    /// 2024 pipeline.
    pub fn sample() -> Self {
        let accounts = SAMPLE_ACCOUNTS
            .iter()
            .map(|seed| Account {
                id: AccountId(seed.id),
                contact_name: seed.contact_name.to_string(),
                contact_email: seed.contact_email.to_string(),
                company: seed.company.to_string(),
                industry: seed.industry.to_string(),
                region: seed.region.to_string(),
                created_date: date(seed.created_date),
            })
            .collect();

        let deals = SAMPLE_DEALS
            .iter()
            .map(|seed| Deal {
                id: DealId(seed.id),
                account_id: AccountId(seed.account_id),
                name: seed.name.to_string(),
                stage: seed.stage,
                amount: Decimal::from(seed.amount),
                probability: seed.probability,
                close_date: date(seed.close_date),
                created_date: date(seed.created_date),
                sales_rep: seed.sales_rep.to_string(),
                product_category: seed.product_category.to_string(),
            })
            .collect();

        Self::build(accounts, deals)
    }
}
