use async_trait::async_trait;
use billboard_core::{Chart, ChartClient, ChartInfo, ChartQuery, Result, Transport};

/// Source of chart data for the HTTP routes
#[async_trait]
pub trait ChartProvider: Send + Sync {
    async fn chart(&self, query: ChartQuery) -> Result<Chart>;

    async fn charts(&self) -> Result<Vec<ChartInfo>>;
}

#[async_trait]
impl<T: Transport + 'static> ChartProvider for ChartClient<T> {
    async fn chart(&self, query: ChartQuery) -> Result<Chart> {
        self.get_chart(query).await
    }

    async fn charts(&self) -> Result<Vec<ChartInfo>> {
        self.list_charts().await
    }
}
