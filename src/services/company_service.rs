// src/services/company_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CompanyRepository,
    models::company::{Company, CreateCompanyPayload},
};

#[derive(Clone)]
pub struct CompanyService {
    repo: CompanyRepository,
    pool: PgPool,
}

impl CompanyService {
    pub fn new(repo: CompanyRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list_companies(&self) -> Result<Vec<Company>, AppError> {
        self.repo.list_all().await
    }

    pub async fn get_company(&self, id: Uuid) -> Result<Company, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::CompanyNotFound)
    }

    pub async fn create_company(&self, payload: &CreateCompanyPayload) -> Result<Company, AppError> {
        let company = self.repo.create(&self.pool, payload).await?;
        tracing::info!("🏢 Empresa criada: {} ({})", company.name, company.id);
        Ok(company)
    }

    /// Popula o catálogo de demonstração quando a tabela está vazia.
    pub async fn seed_if_empty(&self) -> Result<usize, AppError> {
        if self.repo.count().await? > 0 {
            tracing::info!("Empresas já existem, pulando seed");
            return Ok(0);
        }

        let companies = demo_companies();

        // Tudo ou nada
        let mut tx = self.pool.begin().await?;
        for company in &companies {
            self.repo.create(&mut *tx, company).await?;
        }
        tx.commit().await?;

        tracing::info!("✅ {} empresas de teste criadas com sucesso!", companies.len());
        Ok(companies.len())
    }
}

// Nota média e contagem começam em zero: são derivadas das avaliações
pub fn demo_companies() -> Vec<CreateCompanyPayload> {
    vec![
        CreateCompanyPayload {
            name: "TechCorp".into(),
            industry: "Technology".into(),
            location: "San Francisco, CA".into(),
            description: "Leading technology company specializing in software development, cloud solutions, and digital transformation.".into(),
            website: Some("https://techcorp.com".into()),
            founded: Some("2010".into()),
            employees: Some("500-1000".into()),
            revenue: Some("$100M+".into()),
        },
        CreateCompanyPayload {
            name: "InnovateSoft".into(),
            industry: "Software Development".into(),
            location: "New York, NY".into(),
            description: "Innovative software solutions for modern businesses. We help companies digitize and optimize their operations.".into(),
            website: Some("https://innovatesoft.com".into()),
            founded: Some("2015".into()),
            employees: Some("200-500".into()),
            revenue: Some("$50M+".into()),
        },
        CreateCompanyPayload {
            name: "DataFlow".into(),
            industry: "Data Analytics".into(),
            location: "Austin, TX".into(),
            description: "Advanced data analytics and business intelligence solutions. We turn data into actionable insights.".into(),
            website: Some("https://dataflow.com".into()),
            founded: Some("2012".into()),
            employees: Some("100-250".into()),
            revenue: Some("$25M+".into()),
        },
        CreateCompanyPayload {
            name: "CloudTech".into(),
            industry: "Cloud Services".into(),
            location: "Seattle, WA".into(),
            description: "Cloud infrastructure and platform services. We help businesses scale with reliable cloud solutions.".into(),
            website: Some("https://cloudtech.com".into()),
            founded: Some("2018".into()),
            employees: Some("300-600".into()),
            revenue: Some("$75M+".into()),
        },
        CreateCompanyPayload {
            name: "MobileFirst".into(),
            industry: "Mobile Development".into(),
            location: "Boston, MA".into(),
            description: "Mobile app development and consulting services. We create engaging mobile experiences.".into(),
            website: Some("https://mobilefirst.com".into()),
            founded: Some("2016".into()),
            employees: Some("150-300".into()),
            revenue: Some("$30M+".into()),
        },
        CreateCompanyPayload {
            name: "SecureNet".into(),
            industry: "Cybersecurity".into(),
            location: "Washington, DC".into(),
            description: "Enterprise cybersecurity and network protection. We keep your business safe in the digital world.".into(),
            website: Some("https://securenet.com".into()),
            founded: Some("2013".into()),
            employees: Some("400-800".into()),
            revenue: Some("$90M+".into()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn demo_catalog_is_valid_and_unique() {
        let companies = demo_companies();
        assert_eq!(companies.len(), 6);

        for company in &companies {
            assert!(company.validate().is_ok(), "{}", company.name);
        }

        let mut names: Vec<_> = companies.iter().map(|c| c.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn demo_catalog_fields_land_in_the_right_columns() {
        let securenet = demo_companies()
            .into_iter()
            .find(|c| c.name == "SecureNet")
            .unwrap();

        assert_eq!(securenet.industry, "Cybersecurity");
        assert_eq!(securenet.location, "Washington, DC");
        assert_eq!(securenet.website.as_deref(), Some("https://securenet.com"));
        assert_eq!(securenet.founded.as_deref(), Some("2013"));
        assert_eq!(securenet.employees.as_deref(), Some("400-800"));
        assert_eq!(securenet.revenue.as_deref(), Some("$90M+"));
    }
}
