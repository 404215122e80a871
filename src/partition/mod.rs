// 파티션 수명주기 엔진
// 주기 계산, 이름 규칙, DDL/트리거 생성, 배치 복사, 교체 프로토콜을 담당합니다.

pub mod catalog;
pub mod ddl;
pub mod fill;
pub mod naming;
pub mod period;
pub mod settings;
pub mod swap;
pub mod trigger;

pub use catalog::{Catalog, Sequence, StatementRunner};
pub use naming::Table;
pub use period::Period;
pub use settings::PartitionSettings;
