//! The SQL-writing prompt.

/// Builds the prompt asking the model to translate `question` into one SQLite query.
pub fn build_sql_prompt(question: &str, schema: &str) -> String {
  format!(
    "당신은 주식 데이터베이스 전문가입니다. 다음 질문을 SQL 쿼리로 변환하세요.

### 데이터베이스 스키마:
{schema}

### 사용자 질문:
{question}

### 중요한 규칙:
1. 반드시 stock_prices 테이블만 사용하세요
2. 날짜는 'YYYY-MM-DD' 형식으로 처리하세요
3. 시장 구분: KOSPI는 ticker LIKE '%.KS', KOSDAQ는 ticker LIKE '%.KQ'
4. SQLite 데이터베이스를 사용하므로 'dual' 테이블은 사용하지 마세요
5. 계산이 필요한 경우 서브쿼리나 CTE(WITH절)를 사용하세요
6. 전날 대비 비교는 JOIN을 사용하세요:
   - 현재 날짜와 이전 날짜 데이터를 JOIN
   - 예: t1.trading_date = '2024-10-28' AND t2.trading_date = '2024-10-27'
7. 결과는 의미있는 컬럼들만 SELECT 하세요 (stock_name, close_price, change_rate, trading_volume 등)
8. LIMIT을 명시하지 않은 경우 상위 50개로 제한하세요
9. 퍼센트 계산: (new_value - old_value) / old_value >= 비율 (예: 1.0 = 100%)

### 예시 쿼리:

**1. 전날 대비 비교:**
```sql
-- 전날 대비 거래량 100% 증가한 종목
SELECT t1.stock_name, t1.trading_volume, t2.trading_volume as prev_volume,
       ROUND((t1.trading_volume - t2.trading_volume) * 100.0 / t2.trading_volume, 2) as growth_rate
FROM stock_prices t1
JOIN stock_prices t2 ON t1.ticker = t2.ticker
WHERE t1.trading_date = '2024-10-28' 
  AND t2.trading_date = '2024-10-27'
  AND (t1.trading_volume - t2.trading_volume) * 1.0 / t2.trading_volume >= 1.0
ORDER BY growth_rate DESC
LIMIT 50;
```

**2. 비율 계산 (SQLite 호환):**
```sql
-- 특정 종목의 거래량이 전체 시장 대비 차지하는 비율
WITH market_total AS (
    SELECT SUM(trading_volume) as total_volume
    FROM stock_prices 
    WHERE trading_date = '2025-05-23'
),
company_volume AS (
    SELECT trading_volume
    FROM stock_prices 
    WHERE stock_name = '셀트리온' AND trading_date = '2025-05-23'
)
SELECT 
    cv.trading_volume as company_volume,
    mt.total_volume as market_total,
    ROUND(cv.trading_volume * 100.0 / mt.total_volume, 4) as percentage
FROM company_volume cv, market_total mt;
```

### 출력 형식:
```sql
-- 생성된 SQL 쿼리만 반환
SELECT ...
```

SQL 쿼리:"
  )
}
