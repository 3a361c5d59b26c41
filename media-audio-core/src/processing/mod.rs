pub mod pcm;
