pub mod judgement;
