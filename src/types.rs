// src/types.rs
use std::time::Duration;

// 前台发给节拍线程的命令
#[derive(Clone, Debug)]
pub enum EngineCommand {
    SetPeriod(Duration),
    Stop,
}

// 节拍线程发给前台的消息
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    Log(String),
    Ticked(u64),
    // 数据源耗尽或线程退出
    Stopped,
}
