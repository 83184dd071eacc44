//! Create a company and a job, then list and update jobs.
//!
//! ```sh
//! DATABASE_URL=postgres://localhost/jobly cargo run -p jobly --example jobs
//! ```

use jobly::{
    Company, Job, JobFilter, JobPatch, JoblyConfig, JoblyResult, NewCompany, NewJob,
    create_pool_from_config, migrate,
};
use rust_decimal::Decimal;

#[tokio::main]
async fn main() -> JoblyResult<()> {
    let config = JoblyConfig::from_env()?;
    let pool = create_pool_from_config(&config)?;
    migrate::run_pool(&pool).await?;

    let conn = config.tracing_client(pool.get().await?);

    let company = match Company::get(&conn, "anderson").await {
        Ok(detail) => detail.company,
        Err(e) if e.is_not_found() => {
            Company::create(
                &conn,
                &NewCompany::new("anderson", "Anderson, Arias and Morrow", "Everyone loves us")
                    .num_employees(245),
            )
            .await?
        }
        Err(e) => return Err(e),
    };

    let new_job = NewJob::new("Data Engineer", company.handle.clone())
        .salary(110_000)
        .equity(Decimal::new(2, 2));
    let job = match Job::create(&conn, &new_job).await {
        Ok(job) => job,
        Err(e) if e.is_duplicate() => {
            let existing = Job::find_all(&conn, &JobFilter::new().title("data engineer")).await?;
            match existing.into_iter().find(|j| j.company_handle == company.handle) {
                Some(job) => job,
                None => return Err(e),
            }
        }
        Err(e) => return Err(e),
    };

    let patch = JobPatch::from_json(serde_json::json!({"salary": 125000}))?;
    let job = Job::update(&conn, job.id, &patch).await?;
    println!("updated: {}", serde_json::to_string(&job).unwrap_or_default());

    let filter = JobFilter::from_query_pairs([("minSalary", "100000"), ("hasEquity", "true")])?;
    for job in Job::find_all(&conn, &filter).await? {
        println!("{:>8} {:<30} {}", job.id, job.title, job.company_handle);
    }

    Ok(())
}
